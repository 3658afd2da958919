//! Core contracts for catalogen.
//!
//! Defines the read-only metadata store interface consumed by the
//! generation engine, the records it returns, and a JSON snapshot
//! implementation used when no live store is attached.

pub mod error;
pub mod metadata;
pub mod snapshot;

pub use error::{Error, Result};
pub use metadata::{
    AttributeDefinition, AttributeGroupRecord, AttributeSetRecord, AttributeSetTemplate,
    BackendType, CatalogAttribute, CategoryRecord, EntityAttributeRecord, FrontendInput, IdKind,
    LinkAttributeDefinition, MetadataStore, StoreRef, TemplateGroup,
};
pub use snapshot::{MetadataSnapshot, SnapshotAttribute, SnapshotLinkAttribute};

/// Entity type code of catalog products.
pub const CATALOG_PRODUCT: &str = "catalog_product";
/// Entity type code of catalog categories.
pub const CATALOG_CATEGORY: &str = "catalog_category";
/// Link type id used by grouped product links.
pub const LINK_TYPE_GROUPED: u64 = 3;
/// Config path holding the product URL suffix.
pub const PRODUCT_URL_SUFFIX_PATH: &str = "catalog/seo/product_url_suffix";
/// Config path holding the category URL suffix.
pub const CATEGORY_URL_SUFFIX_PATH: &str = "catalog/seo/category_url_suffix";
