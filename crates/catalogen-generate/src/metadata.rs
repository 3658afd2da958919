use std::collections::HashMap;

use catalogen_core::{
    AttributeSetTemplate, BackendType, CATALOG_CATEGORY, CATALOG_PRODUCT,
    CATEGORY_URL_SUFFIX_PATH, LINK_TYPE_GROUPED, LinkAttributeDefinition, MetadataStore,
    PRODUCT_URL_SUFFIX_PATH, StoreRef,
};

use crate::errors::GenerationError;

/// Attribute id and value storage needed to write a value row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRef {
    pub attribute_id: u64,
    pub backend_type: BackendType,
}

/// Read-through cache over the metadata store.
///
/// Scalar lookups happen once at load; attribute definitions, the default
/// set template and the grouped link attributes are fetched on first use.
pub struct MetadataCache<'a> {
    store: &'a dyn MetadataStore,
    product_type_id: u64,
    category_type_id: u64,
    product_url_suffix: String,
    category_url_suffix: String,
    store_ref: StoreRef,
    attributes: HashMap<u64, HashMap<String, AttributeRef>>,
    template: Option<AttributeSetTemplate>,
    link_attributes: Option<Vec<LinkAttributeDefinition>>,
}

impl<'a> MetadataCache<'a> {
    pub fn load(store: &'a dyn MetadataStore) -> Result<Self, GenerationError> {
        Ok(Self {
            store,
            product_type_id: store.entity_type_id(CATALOG_PRODUCT)?,
            category_type_id: store.entity_type_id(CATALOG_CATEGORY)?,
            product_url_suffix: store
                .config_value(PRODUCT_URL_SUFFIX_PATH)?
                .unwrap_or_default(),
            category_url_suffix: store
                .config_value(CATEGORY_URL_SUFFIX_PATH)?
                .unwrap_or_default(),
            store_ref: store.default_store()?,
            attributes: HashMap::new(),
            template: None,
            link_attributes: None,
        })
    }

    pub fn store(&self) -> &'a dyn MetadataStore {
        self.store
    }

    pub fn product_type_id(&self) -> u64 {
        self.product_type_id
    }

    pub fn category_type_id(&self) -> u64 {
        self.category_type_id
    }

    pub fn product_url_suffix(&self) -> &str {
        &self.product_url_suffix
    }

    pub fn category_url_suffix(&self) -> &str {
        &self.category_url_suffix
    }

    pub fn store_id(&self) -> u64 {
        self.store_ref.store_id
    }

    pub fn website_id(&self) -> u64 {
        self.store_ref.website_id
    }

    pub fn product_attribute(&mut self, code: &str) -> Result<AttributeRef, GenerationError> {
        self.attribute(self.product_type_id, code)
    }

    pub fn category_attribute(&mut self, code: &str) -> Result<AttributeRef, GenerationError> {
        self.attribute(self.category_type_id, code)
    }

    fn attribute(
        &mut self,
        entity_type_id: u64,
        code: &str,
    ) -> Result<AttributeRef, GenerationError> {
        let by_code = self.attributes.entry(entity_type_id).or_default();
        if let Some(found) = by_code.get(code) {
            return Ok(*found);
        }

        let definition = self.store.attribute_definition(entity_type_id, code)?;
        let found = AttributeRef {
            attribute_id: definition.attribute_id,
            backend_type: definition.backend_type,
        };
        by_code.insert(code.to_string(), found);
        Ok(found)
    }

    /// Group and attribute layout of the default product attribute set.
    pub fn default_template(&mut self) -> Result<&AttributeSetTemplate, GenerationError> {
        let template = match self.template.take() {
            Some(template) => template,
            None => self
                .store
                .default_attribute_set_template(self.product_type_id)?,
        };
        Ok(self.template.insert(template))
    }

    /// Link attributes of the grouped link type.
    pub fn grouped_link_attributes(
        &mut self,
    ) -> Result<&[LinkAttributeDefinition], GenerationError> {
        let definitions = match self.link_attributes.take() {
            Some(definitions) => definitions,
            None => self.store.link_attribute_definitions(LINK_TYPE_GROUPED)?,
        };
        Ok(self.link_attributes.insert(definitions))
    }
}
