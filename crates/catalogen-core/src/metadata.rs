use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifier families the engine allocates fresh ids for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    CustomerGroup,
    AttributeSet,
    AttributeGroup,
    Attribute,
    AttributeOption,
    Category,
    Product,
    MediaGallery,
    ProductLink,
    SuperAttribute,
}

impl IdKind {
    pub const COUNT: usize = 10;

    pub const ALL: [IdKind; IdKind::COUNT] = [
        IdKind::CustomerGroup,
        IdKind::AttributeSet,
        IdKind::AttributeGroup,
        IdKind::Attribute,
        IdKind::AttributeOption,
        IdKind::Category,
        IdKind::Product,
        IdKind::MediaGallery,
        IdKind::ProductLink,
        IdKind::SuperAttribute,
    ];

    /// Position of the kind inside [`IdKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Table and primary column holding identifiers of this kind.
    pub fn source(self) -> (&'static str, &'static str) {
        match self {
            IdKind::CustomerGroup => ("customer_group", "customer_group_id"),
            IdKind::AttributeSet => ("eav_attribute_set", "attribute_set_id"),
            IdKind::AttributeGroup => ("eav_attribute_group", "attribute_group_id"),
            IdKind::Attribute => ("eav_attribute", "attribute_id"),
            IdKind::AttributeOption => ("eav_attribute_option", "option_id"),
            IdKind::Category => ("catalog_category_entity", "entity_id"),
            IdKind::Product => ("catalog_product_entity", "entity_id"),
            IdKind::MediaGallery => ("catalog_product_entity_media_gallery", "value_id"),
            IdKind::ProductLink => ("catalog_product_link", "link_id"),
            IdKind::SuperAttribute => {
                ("catalog_product_super_attribute", "product_super_attribute_id")
            }
        }
    }
}

/// Value storage family of an EAV attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    Static,
    Varchar,
    Int,
    Text,
    Decimal,
    Datetime,
}

impl BackendType {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendType::Static => "static",
            BackendType::Varchar => "varchar",
            BackendType::Int => "int",
            BackendType::Text => "text",
            BackendType::Decimal => "decimal",
            BackendType::Datetime => "datetime",
        }
    }
}

/// Frontend input kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontendInput {
    Text,
    Textarea,
    Boolean,
    Select,
    #[serde(other)]
    Other,
}

impl FrontendInput {
    pub fn as_str(self) -> &'static str {
        match self {
            FrontendInput::Text => "text",
            FrontendInput::Textarea => "textarea",
            FrontendInput::Boolean => "boolean",
            FrontendInput::Select => "select",
            FrontendInput::Other => "other",
        }
    }
}

/// Attribute id and storage needed to write a value row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub attribute_id: u64,
    pub code: String,
    pub backend_type: BackendType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSetRecord {
    pub attribute_set_id: u64,
    pub entity_type_id: u64,
    pub attribute_set_name: String,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroupRecord {
    pub attribute_group_id: u64,
    pub attribute_set_id: u64,
    pub attribute_group_name: String,
    pub attribute_group_code: String,
    #[serde(default)]
    pub tab_group_code: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub default_id: i64,
}

/// Attribute to set/group assignment (`eav_entity_attribute`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttributeRecord {
    pub entity_type_id: u64,
    pub attribute_set_id: u64,
    pub attribute_group_id: u64,
    pub attribute_id: u64,
    #[serde(default)]
    pub sort_order: i64,
}

/// One group of the default attribute set with its attribute layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGroup {
    pub attribute_group_name: String,
    pub attribute_group_code: String,
    pub tab_group_code: Option<String>,
    pub sort_order: i64,
    pub default_id: i64,
    /// `(attribute_id, sort_order)` pairs in sort order.
    pub attributes: Vec<(u64, i64)>,
}

/// Group/attribute structure of the default attribute set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSetTemplate {
    pub groups: Vec<TemplateGroup>,
}

/// Catalog attribute with its option ids, as needed to render values.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogAttribute {
    pub attribute_id: u64,
    pub attribute_code: String,
    pub frontend_input: FrontendInput,
    pub backend_type: BackendType,
    pub frontend_label: String,
    pub is_filterable: bool,
    pub options: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub entity_id: u64,
    pub parent_id: u64,
    pub path: String,
    pub level: u32,
    #[serde(default)]
    pub position: u32,
    pub attribute_set_id: u64,
}

impl CategoryRecord {
    /// Ids along the materialized path, root first.
    pub fn path_ids(&self) -> Vec<u64> {
        self.path
            .split('/')
            .filter_map(|segment| segment.parse().ok())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttributeDefinition {
    pub link_attribute_id: u64,
    pub code: String,
    pub data_type: BackendType,
}

/// Default store view and its website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRef {
    pub store_id: u64,
    pub website_id: u64,
}

/// Read-only view of the catalog store the dataset is generated against.
///
/// Implementations answer from whatever backs them (a live connection or
/// a snapshot file); the engine never writes through this trait.
pub trait MetadataStore {
    fn entity_type_id(&self, code: &str) -> Result<u64>;

    /// Current maximum identifier for the kind, 0 when empty.
    fn max_id(&self, kind: IdKind) -> Result<u64>;

    fn attribute_definition(&self, entity_type_id: u64, code: &str)
    -> Result<AttributeDefinition>;

    fn default_attribute_set_template(&self, entity_type_id: u64) -> Result<AttributeSetTemplate>;

    fn link_attribute_definitions(&self, link_type_id: u64)
    -> Result<Vec<LinkAttributeDefinition>>;

    /// Customer group ids, excluding the "not logged in" group 0.
    fn customer_group_ids(&self) -> Result<Vec<u64>>;

    fn attribute_sets(&self, entity_type_id: u64) -> Result<Vec<AttributeSetRecord>>;

    /// Groups with exactly this name within sets of the entity type.
    fn attribute_groups_named(
        &self,
        entity_type_id: u64,
        name: &str,
    ) -> Result<Vec<AttributeGroupRecord>>;

    /// Attributes of the entity type whose code starts with `code_prefix`.
    fn catalog_attributes(
        &self,
        entity_type_id: u64,
        code_prefix: &str,
    ) -> Result<Vec<CatalogAttribute>>;

    fn entity_attributes(&self, group_ids: &[u64]) -> Result<Vec<EntityAttributeRecord>>;

    fn category(&self, entity_id: u64) -> Result<CategoryRecord>;

    /// Descendants of the category at `path`, ordered by level then position.
    fn category_subtree(&self, path: &str) -> Result<Vec<CategoryRecord>>;

    fn config_value(&self, path: &str) -> Result<Option<String>>;

    fn default_store(&self) -> Result<StoreRef>;
}
