use catalogen_core::IdKind;
use tracing::debug;

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::state::GeneratorState;

pub const PHASE: &str = "attribute_sets";

/// Prefixed product attribute sets, existing ones first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSets {
    sets: Vec<(String, u64)>,
}

impl ProductSets {
    pub fn ids(&self) -> Vec<u64> {
        self.sets.iter().map(|(_, id)| *id).collect()
    }

    pub fn id_of(&self, name: &str) -> Option<u64> {
        self.sets
            .iter()
            .find(|(set_name, _)| set_name == name)
            .map(|(_, id)| *id)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn push(&mut self, name: String, id: u64) {
        self.sets.push((name, id));
    }
}

/// Creates the `<Prefix> Set #NN` attribute sets missing from the store.
///
/// Each new set clones the groups and attribute placement of the default
/// product attribute set.
pub fn generate(state: &mut GeneratorState<'_>) -> Result<ProductSets, GenerationError> {
    let started = state.enter_phase(PHASE);
    let config = state.config;
    let product_type = state.metadata.product_type_id();
    let set_prefix = format!("{} Set", config.prefix.name);

    let mut sets = ProductSets::default();
    for record in state.metadata.store().attribute_sets(product_type)? {
        if record.attribute_set_name.starts_with(&set_prefix) {
            sets.push(record.attribute_set_name, record.attribute_set_id);
        }
    }

    let template = state.metadata.default_template()?.clone();
    let mut created = 0;
    for i in 1..=config.catalog.attribute.set.count {
        let name = format!("{} Set #{i:02}", config.prefix.name);
        if sets.id_of(&name).is_some() {
            debug!(set = %name, "attribute set already exists");
            continue;
        }

        let set_id = state.ids.next(IdKind::AttributeSet);
        state.output.push(
            TableId::AttributeSet,
            Row::new()
                .with("attribute_set_id", set_id)
                .with("entity_type_id", product_type)
                .with("attribute_set_name", name.as_str())
                .with("sort_order", i64::from(i) + 10),
        );

        for group in &template.groups {
            let group_id = state.ids.next(IdKind::AttributeGroup);
            state.output.push(
                TableId::AttributeGroup,
                group_row(
                    group_id,
                    set_id,
                    &group.attribute_group_name,
                    &group.attribute_group_code,
                    group.tab_group_code.clone().into(),
                    group.sort_order,
                    group.default_id,
                ),
            );

            for (attribute_id, sort_order) in &group.attributes {
                state.output.push(
                    TableId::EntityAttribute,
                    entity_attribute_row(product_type, set_id, group_id, *attribute_id, *sort_order),
                );
            }
        }

        sets.push(name, set_id);
        created += 1;
    }

    state.finish_phase(PHASE, started, created, 0)?;
    Ok(sets)
}

pub(crate) fn group_row(
    group_id: u64,
    set_id: u64,
    name: &str,
    code: &str,
    tab_group_code: SqlValue,
    sort_order: i64,
    default_id: i64,
) -> Row {
    Row::new()
        .with("attribute_group_id", group_id)
        .with("attribute_set_id", set_id)
        .with("attribute_group_name", name)
        .with("sort_order", sort_order)
        .with("default_id", default_id)
        .with("attribute_group_code", code)
        .with("tab_group_code", tab_group_code)
}

pub(crate) fn entity_attribute_row(
    entity_type_id: u64,
    set_id: u64,
    group_id: u64,
    attribute_id: u64,
    sort_order: i64,
) -> Row {
    Row::new()
        .with("entity_attribute_id", SqlValue::Null)
        .with("entity_type_id", entity_type_id)
        .with("attribute_set_id", set_id)
        .with("attribute_group_id", group_id)
        .with("attribute_id", attribute_id)
        .with("sort_order", sort_order)
}
