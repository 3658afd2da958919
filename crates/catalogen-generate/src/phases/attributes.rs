use std::collections::HashMap;

use catalogen_core::{BackendType, CatalogAttribute, FrontendInput, IdKind};
use rand::Rng;

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::state::GeneratorState;

pub const PHASE: &str = "attributes";

const TABLE_SOURCE: &str = "Magento\\Eav\\Model\\Entity\\Attribute\\Source\\Table";
const BOOLEAN_SOURCE: &str = "Magento\\Eav\\Model\\Entity\\Attribute\\Source\\Boolean";

/// The two attribute pools generated per prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePool {
    Regular,
    Filterable,
}

impl AttributePool {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributePool::Regular => "regular",
            AttributePool::Filterable => "filterable",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AttributePool::Regular => "Regular",
            AttributePool::Filterable => "Filterable",
        }
    }
}

/// Prefixed catalog attributes with their options, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AttributeCatalog {
    attributes: Vec<CatalogAttribute>,
    by_id: HashMap<u64, usize>,
}

impl AttributeCatalog {
    pub fn new(attributes: Vec<CatalogAttribute>) -> Self {
        let mut catalog = Self::default();
        for attribute in attributes {
            catalog.insert(attribute);
        }
        catalog
    }

    pub fn get(&self, attribute_id: u64) -> Option<&CatalogAttribute> {
        self.by_id
            .get(&attribute_id)
            .map(|index| &self.attributes[*index])
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.attributes.iter().any(|a| a.attribute_code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogAttribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn regular_ids(&self) -> Vec<u64> {
        self.ids_where(|a| !a.is_filterable)
    }

    pub fn filterable_ids(&self) -> Vec<u64> {
        self.ids_where(|a| a.is_filterable)
    }

    fn ids_where(&self, filter: impl Fn(&CatalogAttribute) -> bool) -> Vec<u64> {
        self.attributes
            .iter()
            .filter(|a| filter(a))
            .map(|a| a.attribute_id)
            .collect()
    }

    fn insert(&mut self, attribute: CatalogAttribute) {
        self.by_id.insert(attribute.attribute_id, self.attributes.len());
        self.attributes.push(attribute);
    }
}

/// Creates the `<prefix>_regular_NN` and `<prefix>_filterable_NN`
/// attributes missing from the store, with options for select inputs.
pub fn generate(state: &mut GeneratorState<'_>) -> Result<AttributeCatalog, GenerationError> {
    let started = state.enter_phase(PHASE);
    let config = state.config;
    let product_type = state.metadata.product_type_id();
    let code_prefix = format!("{}_", config.prefix.code);

    let mut catalog = AttributeCatalog::new(
        state
            .metadata
            .store()
            .catalog_attributes(product_type, &code_prefix)?,
    );

    let attribute = &config.catalog.attribute;
    let mut created = 0;
    for (pool, count) in [
        (AttributePool::Regular, attribute.regular),
        (AttributePool::Filterable, attribute.filterable),
    ] {
        for i in 1..=count {
            let code = format!("{}_{}_{i:02}", config.prefix.code, pool.as_str());
            if catalog.contains_code(&code) {
                continue;
            }
            let created_attribute = create_attribute(state, product_type, pool, i, code)?;
            catalog.insert(created_attribute);
            created += 1;
        }
    }

    state.finish_phase(PHASE, started, created, 0)?;
    Ok(catalog)
}

fn create_attribute(
    state: &mut GeneratorState<'_>,
    product_type: u64,
    pool: AttributePool,
    index: u32,
    code: String,
) -> Result<CatalogAttribute, GenerationError> {
    let (input, backend, source_model) = match pool {
        AttributePool::Filterable => (FrontendInput::Select, BackendType::Int, Some(TABLE_SOURCE)),
        AttributePool::Regular => match state.rng.random_range(1..=8) {
            1 | 5 => (FrontendInput::Select, BackendType::Int, Some(TABLE_SOURCE)),
            7 => (FrontendInput::Boolean, BackendType::Int, Some(BOOLEAN_SOURCE)),
            4 => (FrontendInput::Textarea, BackendType::Text, None),
            _ => (FrontendInput::Text, BackendType::Varchar, None),
        },
    };
    let is_filterable = pool == AttributePool::Filterable;
    let label = format!("{} {index:02}", pool.label());
    let attribute_id = state.ids.next(IdKind::Attribute);

    state.output.push(
        TableId::Attribute,
        Row::new()
            .with("attribute_id", attribute_id)
            .with("entity_type_id", product_type)
            .with("attribute_code", code.as_str())
            .with("attribute_model", SqlValue::Null)
            .with("backend_model", SqlValue::Null)
            .with("backend_type", backend.as_str())
            .with("backend_table", SqlValue::Null)
            .with("frontend_model", SqlValue::Null)
            .with("frontend_input", input.as_str())
            .with("frontend_label", label.as_str())
            .with("frontend_class", SqlValue::Null)
            .with("source_model", source_model)
            .with("is_required", 0_i64)
            .with("is_user_defined", 1_i64)
            .with("default_value", SqlValue::Null)
            .with("is_unique", 0_i64)
            .with("note", SqlValue::Null),
    );

    let flag = i64::from(is_filterable);
    state.output.push(
        TableId::CatalogAttribute,
        Row::new()
            .with("attribute_id", attribute_id)
            .with("frontend_input_renderer", SqlValue::Null)
            .with("is_global", 1_i64)
            .with("is_visible", 1_i64)
            .with("is_searchable", 0_i64)
            .with("is_filterable", flag)
            .with("is_comparable", 0_i64)
            .with("is_visible_on_front", 1_i64)
            .with("is_html_allowed_on_front", 0_i64)
            .with("is_used_for_price_rules", 0_i64)
            .with("is_filterable_in_search", flag)
            .with("used_in_product_listing", 0_i64)
            .with("used_for_sort_by", 0_i64)
            .with("apply_to", SqlValue::Null)
            .with("is_visible_in_advanced_search", 0_i64)
            .with("position", 0_i64)
            .with("is_wysiwyg_enabled", 0_i64)
            .with("is_used_for_promo_rules", 0_i64)
            .with("is_required_in_admin_store", 0_i64)
            .with("is_used_in_grid", flag)
            .with("is_visible_in_grid", 0_i64)
            .with("is_filterable_in_grid", flag)
            .with("search_weight", 2_i64)
            .with("additional_data", SqlValue::Null),
    );

    let mut options = Vec::new();
    if input == FrontendInput::Select {
        let bounds = state.config.catalog.attribute.options;
        let count = state.rng.random_range(bounds.min..=bounds.max);
        for j in 1..=count {
            let option_id = state.ids.next(IdKind::AttributeOption);
            state.output.push(
                TableId::AttributeOption,
                Row::new()
                    .with("option_id", option_id)
                    .with("attribute_id", attribute_id)
                    .with("sort_order", j),
            );
            state.output.push(
                TableId::AttributeOptionValue,
                Row::new()
                    .with("value_id", SqlValue::Null)
                    .with("option_id", option_id)
                    .with("store_id", 0_i64)
                    .with("value", format!("Option {index:02}-{j:03}")),
            );
            options.push(option_id);
        }
    }

    Ok(CatalogAttribute {
        attribute_id,
        attribute_code: code,
        frontend_input: input,
        backend_type: backend,
        frontend_label: label,
        is_filterable,
        options,
    })
}
