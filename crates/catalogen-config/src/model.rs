use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Root of the dataset configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatasetConfig {
    /// Code/name prefixes stamped on every generated entity.
    #[serde(default)]
    pub prefix: PrefixConfig,
    #[serde(default)]
    pub customer: CustomerConfig,
    pub catalog: CatalogConfig,
    /// Path of the bulk-load SQL script.
    pub output: PathBuf,
    /// Seed for the random generator; a fresh seed is drawn when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Products generated between two buffer flushes.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Metadata snapshot to generate against; a fresh install when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PathBuf>,
}

fn default_batch_size() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrefixConfig {
    #[serde(default = "default_prefix_code")]
    pub code: String,
    #[serde(default = "default_prefix_name")]
    pub name: String,
}

fn default_prefix_code() -> String {
    "oro".to_string()
}

fn default_prefix_name() -> String {
    "Oro".to_string()
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            code: default_prefix_code(),
            name: default_prefix_name(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CustomerConfig {
    #[serde(default)]
    pub group: CustomerGroupConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CustomerGroupConfig {
    /// Target number of customer groups; 0 disables the phase.
    #[serde(default)]
    pub count: u32,
}

/// Inclusive `min..=max` range for random draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogConfig {
    pub attribute: AttributeConfig,
    pub category: CategoryConfig,
    pub product: ProductConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttributeConfig {
    pub set: AttributeSetConfig,
    /// Number of regular (non-filterable) attributes.
    #[serde(default)]
    pub regular: u32,
    /// Number of filterable select attributes.
    #[serde(default)]
    pub filterable: u32,
    /// Option count drawn for each select attribute.
    pub options: Bounds,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttributeSetConfig {
    #[serde(default)]
    pub count: u32,
    /// Attributes of each pool assigned to a new set.
    pub regular: Bounds,
    /// Overrides `regular` for the filterable pool draw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<Bounds>,
}

impl AttributeSetConfig {
    pub fn filterable_bounds(&self) -> Bounds {
        self.filterable.unwrap_or(self.regular)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryConfig {
    /// Category the generated tree hangs under.
    #[serde(default = "default_root_category")]
    pub root: u64,
    /// Depth of the generated tree; leaves live at this depth.
    pub deep: u32,
    /// Number of top-level categories.
    pub top: u32,
    /// Children per non-top category.
    pub min: u32,
    pub max: u32,
}

fn default_root_category() -> u64 {
    2
}

impl CategoryConfig {
    pub fn children(&self) -> Bounds {
        Bounds::new(self.min, self.max)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProductConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<SimpleProductConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped: Option<GroupedProductConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<ConfigurableProductConfig>,
    /// Leaf categories per product unless a product type overrides it.
    #[serde(default)]
    pub category: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageConfig>,
}

/// Settings shared by every product type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductCommon {
    pub count: u64,
    /// Offset added to the SKU index.
    #[serde(default)]
    pub start: u64,
    /// Percentage of disabled products.
    #[serde(default)]
    pub disabled: u32,
    /// Stock quantity range; quantity is 0 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Bounds>,
    /// Percentage of out-of-stock items.
    #[serde(default)]
    pub out_of_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Bounds>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PriceConfig {
    pub min: f64,
    pub max: f64,
    /// Chance (percent) of a special price.
    #[serde(default)]
    pub special: u32,
    /// Chance (percent) of group prices, also the per-group inclusion rate.
    #[serde(default)]
    pub group: u32,
    /// Chance (percent) of tier prices, also the per-tier inclusion rate.
    #[serde(default)]
    pub tier: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SimpleProductConfig {
    #[serde(flatten)]
    pub common: ProductCommon,
    pub price: PriceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GroupedProductConfig {
    #[serde(flatten)]
    pub common: ProductCommon,
    /// Simple products linked to each grouped product.
    pub associated: Bounds,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConfigurableProductConfig {
    #[serde(flatten)]
    pub common: ProductCommon,
    /// Super attributes per configurable product.
    pub attribute: Bounds,
    /// Simple products linked to each configurable product.
    pub associated: Bounds,
    /// Only `min` and `max` apply; configurable products carry no derived prices.
    pub price: PriceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageConfig {
    pub min: u32,
    pub max: u32,
    /// Path of the media manifest.
    pub output: PathBuf,
}

impl ImageConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min, self.max)
    }
}
