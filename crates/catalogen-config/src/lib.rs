//! Dataset configuration contracts and validation.
//!
//! The configuration document is checked in three passes: structurally
//! against the JSON Schema derived from [`DatasetConfig`], by typed
//! deserialization, and semantically (ranges, percentages, dependent
//! sections).

pub mod errors;
pub mod load;
pub mod model;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, ValidationIssue, ValidationReport};
pub use load::{load_config, parse_config_document};
pub use model::{
    AttributeConfig, AttributeSetConfig, Bounds, CatalogConfig, CategoryConfig,
    ConfigurableProductConfig, CustomerConfig, CustomerGroupConfig, DatasetConfig,
    GroupedProductConfig, ImageConfig, PrefixConfig, PriceConfig, ProductCommon, ProductConfig,
    SimpleProductConfig,
};
pub use validate::{
    ValidatedConfig, config_json_schema, validate_config, validate_config_json, validate_document,
};
