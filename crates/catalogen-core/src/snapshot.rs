use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::{
    AttributeDefinition, AttributeGroupRecord, AttributeSetRecord, AttributeSetTemplate,
    BackendType, CatalogAttribute, CategoryRecord, EntityAttributeRecord, FrontendInput, IdKind,
    LinkAttributeDefinition, MetadataStore, StoreRef, TemplateGroup,
};
use crate::{CATALOG_CATEGORY, CATALOG_PRODUCT, CATEGORY_URL_SUFFIX_PATH, PRODUCT_URL_SUFFIX_PATH};

const DEFAULT_SET_NAME: &str = "Default";

/// Attribute row of a snapshot (`eav_attribute` joined with its options).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAttribute {
    pub attribute_id: u64,
    pub entity_type_id: u64,
    pub attribute_code: String,
    pub backend_type: BackendType,
    #[serde(default = "default_frontend_input")]
    pub frontend_input: FrontendInput,
    #[serde(default)]
    pub frontend_label: String,
    #[serde(default)]
    pub is_filterable: bool,
    #[serde(default)]
    pub options: Vec<u64>,
}

fn default_frontend_input() -> FrontendInput {
    FrontendInput::Text
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLinkAttribute {
    pub link_type_id: u64,
    pub product_link_attribute_id: u64,
    pub product_link_attribute_code: String,
    pub data_type: BackendType,
}

/// Point-in-time copy of the catalog metadata, loadable from JSON.
///
/// Identifier maxima are derived from the captured rows; `max_ids` only
/// needs entries for kinds whose rows are not part of the snapshot
/// (products, media, links, super attributes) or to raise a floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    pub entity_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub max_ids: BTreeMap<IdKind, u64>,
    #[serde(default)]
    pub customer_groups: Vec<u64>,
    #[serde(default)]
    pub attributes: Vec<SnapshotAttribute>,
    #[serde(default)]
    pub attribute_sets: Vec<AttributeSetRecord>,
    #[serde(default)]
    pub attribute_groups: Vec<AttributeGroupRecord>,
    #[serde(default)]
    pub entity_attributes: Vec<EntityAttributeRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub link_attributes: Vec<SnapshotLinkAttribute>,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    pub store: StoreRef,
}

impl MetadataSnapshot {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: MetadataSnapshot = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Checks the structural invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        for category in &self.categories {
            if category.path_ids().last() != Some(&category.entity_id) {
                return Err(Error::InvalidSnapshot(format!(
                    "category {} path '{}' does not end with its id",
                    category.entity_id, category.path
                )));
            }
        }
        for group in &self.attribute_groups {
            if !self
                .attribute_sets
                .iter()
                .any(|set| set.attribute_set_id == group.attribute_set_id)
            {
                return Err(Error::InvalidSnapshot(format!(
                    "attribute group {} references unknown set {}",
                    group.attribute_group_id, group.attribute_set_id
                )));
            }
        }
        Ok(())
    }

    /// Metadata of a freshly installed store: default attribute sets,
    /// the system attributes the generator writes values for, the root
    /// and default categories, and the stock customer groups.
    pub fn fresh_install() -> Self {
        let category_type = 3;
        let product_type = 4;

        let mut entity_types = BTreeMap::new();
        entity_types.insert(CATALOG_CATEGORY.to_string(), category_type);
        entity_types.insert(CATALOG_PRODUCT.to_string(), product_type);

        let category_attributes: [(u64, &str, BackendType); 9] = [
            (45, "name", BackendType::Varchar),
            (46, "is_active", BackendType::Int),
            (53, "display_mode", BackendType::Varchar),
            (54, "is_anchor", BackendType::Int),
            (63, "custom_use_parent_settings", BackendType::Int),
            (64, "custom_apply_to_products", BackendType::Int),
            (69, "include_in_menu", BackendType::Int),
            (119, "url_key", BackendType::Varchar),
            (120, "url_path", BackendType::Varchar),
        ];
        let product_attributes: [(u64, &str, BackendType); 21] = [
            (73, "name", BackendType::Varchar),
            (74, "sku", BackendType::Static),
            (75, "description", BackendType::Text),
            (76, "short_description", BackendType::Text),
            (77, "price", BackendType::Decimal),
            (78, "special_price", BackendType::Decimal),
            (79, "special_from_date", BackendType::Datetime),
            (80, "special_to_date", BackendType::Datetime),
            (82, "weight", BackendType::Decimal),
            (87, "image", BackendType::Varchar),
            (88, "small_image", BackendType::Varchar),
            (89, "thumbnail", BackendType::Varchar),
            (90, "media_gallery", BackendType::Static),
            (97, "status", BackendType::Int),
            (99, "visibility", BackendType::Int),
            (106, "page_layout", BackendType::Varchar),
            (110, "options_container", BackendType::Varchar),
            (115, "quantity_and_stock_status", BackendType::Int),
            (121, "url_key", BackendType::Varchar),
            (124, "tax_class_id", BackendType::Int),
            (125, "gift_message_available", BackendType::Varchar),
        ];

        let mut attributes = Vec::new();
        for (entity_type_id, rows) in [
            (category_type, &category_attributes[..]),
            (product_type, &product_attributes[..]),
        ] {
            for (attribute_id, code, backend_type) in rows {
                attributes.push(SnapshotAttribute {
                    attribute_id: *attribute_id,
                    entity_type_id,
                    attribute_code: code.to_string(),
                    backend_type: *backend_type,
                    frontend_input: FrontendInput::Other,
                    frontend_label: String::new(),
                    is_filterable: false,
                    options: Vec::new(),
                });
            }
        }

        let attribute_sets = vec![
            AttributeSetRecord {
                attribute_set_id: 3,
                entity_type_id: category_type,
                attribute_set_name: DEFAULT_SET_NAME.to_string(),
                sort_order: 1,
            },
            AttributeSetRecord {
                attribute_set_id: 4,
                entity_type_id: product_type,
                attribute_set_name: DEFAULT_SET_NAME.to_string(),
                sort_order: 1,
            },
        ];

        let group = |id: u64, set: u64, name: &str, code: &str, tab: Option<&str>, sort: i64| {
            AttributeGroupRecord {
                attribute_group_id: id,
                attribute_set_id: set,
                attribute_group_name: name.to_string(),
                attribute_group_code: code.to_string(),
                tab_group_code: tab.map(str::to_string),
                sort_order: sort,
                default_id: i64::from(sort == 1),
            }
        };
        let attribute_groups = vec![
            group(3, 3, "General Information", "general-information", None, 1),
            group(7, 4, "Product Details", "product-details", Some("basic"), 1),
            group(10, 4, "Content", "content", Some("basic"), 2),
            group(11, 4, "Images", "image-management", Some("basic"), 3),
            group(12, 4, "Search Engine Optimization", "search-engine-optimization", Some("basic"), 4),
        ];

        let mut entity_attributes = Vec::new();
        for (sort_order, (attribute_id, _, _)) in category_attributes.iter().enumerate() {
            entity_attributes.push(EntityAttributeRecord {
                entity_type_id: category_type,
                attribute_set_id: 3,
                attribute_group_id: 3,
                attribute_id: *attribute_id,
                sort_order: sort_order as i64 + 1,
            });
        }
        let product_layout: [(u64, u64); 21] = [
            (73, 7),
            (74, 7),
            (77, 7),
            (124, 7),
            (115, 7),
            (82, 7),
            (99, 7),
            (97, 7),
            (78, 7),
            (79, 7),
            (80, 7),
            (110, 7),
            (106, 7),
            (125, 7),
            (75, 10),
            (76, 10),
            (87, 11),
            (88, 11),
            (89, 11),
            (90, 11),
            (121, 12),
        ];
        for (sort_order, (attribute_id, group_id)) in product_layout.iter().enumerate() {
            entity_attributes.push(EntityAttributeRecord {
                entity_type_id: product_type,
                attribute_set_id: 4,
                attribute_group_id: *group_id,
                attribute_id: *attribute_id,
                sort_order: sort_order as i64 + 1,
            });
        }

        let categories = vec![
            CategoryRecord {
                entity_id: 1,
                parent_id: 0,
                path: "1".to_string(),
                level: 0,
                position: 0,
                attribute_set_id: 3,
            },
            CategoryRecord {
                entity_id: 2,
                parent_id: 1,
                path: "1/2".to_string(),
                level: 1,
                position: 1,
                attribute_set_id: 3,
            },
        ];

        let link_attributes = vec![
            SnapshotLinkAttribute {
                link_type_id: 3,
                product_link_attribute_id: 3,
                product_link_attribute_code: "position".to_string(),
                data_type: BackendType::Int,
            },
            SnapshotLinkAttribute {
                link_type_id: 3,
                product_link_attribute_id: 5,
                product_link_attribute_code: "qty".to_string(),
                data_type: BackendType::Decimal,
            },
        ];

        let mut config = BTreeMap::new();
        config.insert(PRODUCT_URL_SUFFIX_PATH.to_string(), ".html".to_string());
        config.insert(CATEGORY_URL_SUFFIX_PATH.to_string(), ".html".to_string());

        Self {
            entity_types,
            max_ids: BTreeMap::new(),
            customer_groups: vec![0, 1, 2, 3],
            attributes,
            attribute_sets,
            attribute_groups,
            entity_attributes,
            categories,
            link_attributes,
            config,
            store: StoreRef {
                store_id: 1,
                website_id: 1,
            },
        }
    }

    fn derived_max(&self, kind: IdKind) -> u64 {
        let max = match kind {
            IdKind::CustomerGroup => self.customer_groups.iter().copied().max(),
            IdKind::AttributeSet => self.attribute_sets.iter().map(|s| s.attribute_set_id).max(),
            IdKind::AttributeGroup => self
                .attribute_groups
                .iter()
                .map(|g| g.attribute_group_id)
                .max(),
            IdKind::Attribute => self.attributes.iter().map(|a| a.attribute_id).max(),
            IdKind::AttributeOption => self
                .attributes
                .iter()
                .flat_map(|a| a.options.iter().copied())
                .max(),
            IdKind::Category => self.categories.iter().map(|c| c.entity_id).max(),
            IdKind::Product
            | IdKind::MediaGallery
            | IdKind::ProductLink
            | IdKind::SuperAttribute => None,
        };
        max.unwrap_or(0)
    }
}

impl MetadataStore for MetadataSnapshot {
    fn entity_type_id(&self, code: &str) -> Result<u64> {
        self.entity_types
            .get(code)
            .copied()
            .ok_or_else(|| Error::UnknownEntityType(code.to_string()))
    }

    fn max_id(&self, kind: IdKind) -> Result<u64> {
        let declared = self.max_ids.get(&kind).copied().unwrap_or(0);
        Ok(declared.max(self.derived_max(kind)))
    }

    fn attribute_definition(
        &self,
        entity_type_id: u64,
        code: &str,
    ) -> Result<AttributeDefinition> {
        self.attributes
            .iter()
            .find(|a| a.entity_type_id == entity_type_id && a.attribute_code == code)
            .map(|a| AttributeDefinition {
                attribute_id: a.attribute_id,
                code: a.attribute_code.clone(),
                backend_type: a.backend_type,
            })
            .ok_or_else(|| Error::UnknownAttribute {
                entity_type_id,
                code: code.to_string(),
            })
    }

    fn default_attribute_set_template(&self, entity_type_id: u64) -> Result<AttributeSetTemplate> {
        let set_id = self
            .attribute_sets
            .iter()
            .find(|s| s.entity_type_id == entity_type_id && s.attribute_set_name == DEFAULT_SET_NAME)
            .map(|s| s.attribute_set_id)
            .ok_or(Error::MissingDefaultSet(entity_type_id))?;

        let mut groups: Vec<&AttributeGroupRecord> = self
            .attribute_groups
            .iter()
            .filter(|g| g.attribute_set_id == set_id)
            .collect();
        groups.sort_by_key(|g| g.sort_order);

        let mut relations: Vec<&EntityAttributeRecord> = self
            .entity_attributes
            .iter()
            .filter(|r| r.attribute_set_id == set_id && r.entity_type_id == entity_type_id)
            .collect();
        relations.sort_by_key(|r| r.sort_order);

        let groups = groups
            .into_iter()
            .map(|g| TemplateGroup {
                attribute_group_name: g.attribute_group_name.clone(),
                attribute_group_code: g.attribute_group_code.clone(),
                tab_group_code: g.tab_group_code.clone(),
                sort_order: g.sort_order,
                default_id: g.default_id,
                attributes: relations
                    .iter()
                    .filter(|r| r.attribute_group_id == g.attribute_group_id)
                    .map(|r| (r.attribute_id, r.sort_order))
                    .collect(),
            })
            .collect();

        Ok(AttributeSetTemplate { groups })
    }

    fn link_attribute_definitions(
        &self,
        link_type_id: u64,
    ) -> Result<Vec<LinkAttributeDefinition>> {
        Ok(self
            .link_attributes
            .iter()
            .filter(|l| l.link_type_id == link_type_id)
            .map(|l| LinkAttributeDefinition {
                link_attribute_id: l.product_link_attribute_id,
                code: l.product_link_attribute_code.clone(),
                data_type: l.data_type,
            })
            .collect())
    }

    fn customer_group_ids(&self) -> Result<Vec<u64>> {
        Ok(self
            .customer_groups
            .iter()
            .copied()
            .filter(|id| *id != 0)
            .collect())
    }

    fn attribute_sets(&self, entity_type_id: u64) -> Result<Vec<AttributeSetRecord>> {
        Ok(self
            .attribute_sets
            .iter()
            .filter(|s| s.entity_type_id == entity_type_id)
            .cloned()
            .collect())
    }

    fn attribute_groups_named(
        &self,
        entity_type_id: u64,
        name: &str,
    ) -> Result<Vec<AttributeGroupRecord>> {
        Ok(self
            .attribute_groups
            .iter()
            .filter(|g| g.attribute_group_name == name)
            .filter(|g| {
                self.attribute_sets.iter().any(|s| {
                    s.attribute_set_id == g.attribute_set_id && s.entity_type_id == entity_type_id
                })
            })
            .cloned()
            .collect())
    }

    fn catalog_attributes(
        &self,
        entity_type_id: u64,
        code_prefix: &str,
    ) -> Result<Vec<CatalogAttribute>> {
        Ok(self
            .attributes
            .iter()
            .filter(|a| a.entity_type_id == entity_type_id)
            .filter(|a| a.attribute_code.starts_with(code_prefix))
            .map(|a| CatalogAttribute {
                attribute_id: a.attribute_id,
                attribute_code: a.attribute_code.clone(),
                frontend_input: a.frontend_input,
                backend_type: a.backend_type,
                frontend_label: a.frontend_label.clone(),
                is_filterable: a.is_filterable,
                options: a.options.clone(),
            })
            .collect())
    }

    fn entity_attributes(&self, group_ids: &[u64]) -> Result<Vec<EntityAttributeRecord>> {
        Ok(self
            .entity_attributes
            .iter()
            .filter(|r| group_ids.contains(&r.attribute_group_id))
            .cloned()
            .collect())
    }

    fn category(&self, entity_id: u64) -> Result<CategoryRecord> {
        self.categories
            .iter()
            .find(|c| c.entity_id == entity_id)
            .cloned()
            .ok_or(Error::CategoryNotFound(entity_id))
    }

    fn category_subtree(&self, path: &str) -> Result<Vec<CategoryRecord>> {
        let prefix = format!("{path}/");
        let mut rows: Vec<CategoryRecord> = self
            .categories
            .iter()
            .filter(|c| c.path.starts_with(&prefix))
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.level, c.position));
        Ok(rows)
    }

    fn config_value(&self, path: &str) -> Result<Option<String>> {
        Ok(self.config.get(path).cloned())
    }

    fn default_store(&self) -> Result<StoreRef> {
        Ok(self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_id_prefers_declared_floor() {
        let mut snapshot = MetadataSnapshot::fresh_install();
        assert_eq!(snapshot.max_id(IdKind::Category).unwrap(), 2);
        assert_eq!(snapshot.max_id(IdKind::Product).unwrap(), 0);

        snapshot.max_ids.insert(IdKind::Category, 40);
        snapshot.max_ids.insert(IdKind::Product, 1200);
        assert_eq!(snapshot.max_id(IdKind::Category).unwrap(), 40);
        assert_eq!(snapshot.max_id(IdKind::Product).unwrap(), 1200);
    }

    #[test]
    fn customer_groups_skip_not_logged_in() {
        let snapshot = MetadataSnapshot::fresh_install();
        assert_eq!(snapshot.customer_group_ids().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn validate_rejects_path_without_own_id() {
        let mut snapshot = MetadataSnapshot::fresh_install();
        snapshot.categories[1].path = "1/9".to_string();
        assert!(matches!(snapshot.validate(), Err(Error::InvalidSnapshot(_))));
    }
}
