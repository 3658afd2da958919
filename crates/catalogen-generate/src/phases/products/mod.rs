//! Product generation: simple products first, then the grouped and
//! configurable products built on top of them.

use std::collections::{BTreeMap, HashMap};

use catalogen_config::{Bounds, ProductCommon};
use catalogen_core::{BackendType, FrontendInput, IdKind};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::phases::assignments::SetAssignments;
use crate::phases::attributes::AttributeCatalog;
use crate::phases::categories::{CategoryBucket, CategoryIndex, url_rewrite_row};
use crate::state::GeneratorState;
use crate::text::{Sku, random_words};

pub mod configurable;
pub mod grouped;
pub mod inventory;
pub mod media;
pub mod pricing;
pub mod simple;

const CREATED_AT: &str = "2015-01-01 00:00:00";
const VISIBILITY_BOTH: i64 = 4;
const STATUS_ENABLED: i64 = 1;
const STATUS_DISABLED: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    Simple,
    Grouped,
    Configurable,
}

impl ProductKind {
    pub fn type_id(self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::Grouped => "grouped",
            ProductKind::Configurable => "configurable",
        }
    }

    /// Products between two progress lines.
    fn progress_every(self) -> u64 {
        match self {
            ProductKind::Simple => 10_000,
            ProductKind::Grouped | ProductKind::Configurable => 1_000,
        }
    }
}

/// Outputs of the earlier phases every product generator reads.
#[derive(Debug, Clone, Copy)]
pub struct ProductInputs<'c> {
    pub categories: &'c CategoryIndex,
    pub assignments: &'c SetAssignments,
    pub attributes: &'c AttributeCatalog,
    /// Non-zero customer group ids.
    pub customer_groups: &'c [u64],
}

/// Filterable option ids a simple product carries, keyed by attribute.
pub type Signature = BTreeMap<u64, Option<u64>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleVariant {
    pub product_id: u64,
    pub signature: Signature,
}

/// Simple products available as children of composite products.
#[derive(Debug, Clone, Default)]
pub struct SimplePools {
    all: Vec<u64>,
    by_set: HashMap<u64, Vec<SimpleVariant>>,
}

impl SimplePools {
    pub fn all(&self) -> &[u64] {
        &self.all
    }

    pub fn variants(&self, set_id: u64) -> &[SimpleVariant] {
        self.by_set.get(&set_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_variants(&self) -> bool {
        self.by_set.values().any(|variants| !variants.is_empty())
    }

    pub(crate) fn push_global(&mut self, product_id: u64) {
        self.all.push(product_id);
    }

    pub(crate) fn push_variant(&mut self, set_id: u64, variant: SimpleVariant) {
        self.by_set.entry(set_id).or_default().push(variant);
    }
}

/// Identity of a product whose entity row has been written.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: u64,
    pub sku: Sku,
    pub attribute_set_id: u64,
}

/// Runs `count` iterations of a product generator.
///
/// Each iteration picks a random top-level bucket; a missing bucket or one
/// without leaves consumes the iteration and is counted as skipped.
/// Buffers are flushed every `batch_size` products. Returns
/// `(created, skipped)`.
pub(crate) fn run_products<F>(
    state: &mut GeneratorState<'_>,
    kind: ProductKind,
    count: u64,
    categories: &CategoryIndex,
    mut build: F,
) -> Result<(u64, u64), GenerationError>
where
    F: FnMut(&mut GeneratorState<'_>, &CategoryBucket, u64) -> Result<(), GenerationError>,
{
    let batch_size = state.config.batch_size.max(1);
    let mut created = 0;
    let mut skipped = 0;

    for index in 1..=count {
        match categories.choose(&mut state.rng) {
            None => {
                debug!(kind = kind.type_id(), "no top-level category");
                state.report.record_skip("no_top_category");
                skipped += 1;
            }
            Some(bucket) if bucket.leaves.is_empty() => {
                debug!(kind = kind.type_id(), category = bucket.top_id, "bucket has no leaves");
                state.report.record_skip("bucket_without_leaves");
                skipped += 1;
            }
            Some(bucket) => {
                build(state, bucket, index)?;
                created += 1;
            }
        }

        if index % batch_size == 0 {
            state.output.flush_all()?;
        }
        if index % kind.progress_every() == 0 {
            info!(kind = kind.type_id(), done = index, total = count, "products generated");
        }
    }
    Ok((created, skipped))
}

/// Writes the entity, sequence and base attribute rows shared by every
/// product type, then places the product in categories, the website and
/// stock, and attaches its images.
pub(crate) fn create_product(
    state: &mut GeneratorState<'_>,
    kind: ProductKind,
    common: &ProductCommon,
    bucket: &CategoryBucket,
    categories: &CategoryIndex,
    index: u64,
) -> Result<NewProduct, GenerationError> {
    let attribute_set_id = bucket
        .attribute_set_id
        .ok_or(GenerationError::NoAttributeSet(bucket.top_id))?;
    let id = state.ids.next(IdKind::Product);
    let sku = Sku::random(&mut state.rng, &state.config.prefix.code, common.start + index);
    let has_options = i64::from(kind == ProductKind::Configurable);

    state.output.push(
        TableId::ProductEntity,
        Row::new()
            .with("entity_id", id)
            .with("created_in", 1_i64)
            .with("updated_in", state.timestamp)
            .with("attribute_set_id", attribute_set_id)
            .with("type_id", kind.type_id())
            .with("sku", sku.to_string())
            .with("has_options", has_options)
            .with("required_options", has_options)
            .with("created_at", CREATED_AT)
            .with("updated_at", CREATED_AT),
    );
    state.output.push(
        TableId::SequenceProduct,
        Row::new().with("sequence_value", id),
    );

    let status = if state.rng.random_range(1..=100) > common.disabled {
        STATUS_ENABLED
    } else {
        STATUS_DISABLED
    };
    let name = random_words(&mut state.rng, 1, 3, 10);
    let description = random_words(&mut state.rng, 10, 30, 15);
    let short_description = random_words(&mut state.rng, 2, 10, 10);

    let values: [(&str, SqlValue); 10] = [
        ("name", name.into()),
        ("url_key", sku.url_key().into()),
        ("page_layout", SqlValue::Null),
        ("options_container", "container1".into()),
        ("status", status.into()),
        ("visibility", VISIBILITY_BOTH.into()),
        ("tax_class_id", 0_i64.into()),
        ("description", description.into()),
        ("short_description", short_description.into()),
        ("quantity_and_stock_status", 1_i64.into()),
    ];
    for (code, value) in values {
        push_attribute_value(state, id, code, value)?;
    }

    let product = NewProduct {
        id,
        sku,
        attribute_set_id,
    };
    let bounds = common
        .category
        .unwrap_or(state.config.catalog.product.category);
    assign_categories(state, &product, bucket, categories, bounds);
    inventory::push_stock_item(state, id, common);
    media::attach_images(state, &product)?;
    Ok(product)
}

/// Emits a store-0 value row for a system attribute; static attributes
/// live on the entity row and are skipped.
pub(crate) fn push_attribute_value(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    code: &str,
    value: SqlValue,
) -> Result<(), GenerationError> {
    let attribute = state.metadata.product_attribute(code)?;
    if attribute.backend_type == BackendType::Static {
        return Ok(());
    }
    state.output.push(
        TableId::ProductValue(attribute.backend_type),
        value_row(attribute.attribute_id, product_id, value),
    );
    Ok(())
}

fn value_row(attribute_id: u64, product_id: u64, value: SqlValue) -> Row {
    Row::new()
        .with("value_id", SqlValue::Null)
        .with("attribute_id", attribute_id)
        .with("store_id", 0_i64)
        .with("row_id", product_id)
        .with("value", value)
}

/// Renders values for the assigned custom attributes accepted by `keep`.
///
/// Returns the option chosen for every filterable attribute rendered,
/// `None` when the attribute has no options.
pub(crate) fn push_custom_attributes(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    attribute_ids: &[u64],
    catalog: &AttributeCatalog,
    keep: impl Fn(bool) -> bool,
) -> Signature {
    let mut signature = Signature::new();
    for attribute_id in attribute_ids {
        let Some(attribute) = catalog.get(*attribute_id) else {
            continue;
        };
        if !keep(attribute.is_filterable) {
            continue;
        }

        let value = match attribute.frontend_input {
            FrontendInput::Select => {
                let option = attribute.options.choose(&mut state.rng).copied();
                if attribute.is_filterable {
                    signature.insert(attribute.attribute_id, option);
                }
                match option {
                    Some(option) => SqlValue::from(option),
                    None => continue,
                }
            }
            FrontendInput::Boolean => SqlValue::Int(state.rng.random_range(0..=1)),
            FrontendInput::Text => random_words(&mut state.rng, 2, 10, 12).into(),
            FrontendInput::Textarea => random_words(&mut state.rng, 10, 30, 15).into(),
            FrontendInput::Other => continue,
        };
        state.output.push(
            TableId::ProductValue(attribute.backend_type),
            value_row(attribute.attribute_id, product_id, value),
        );
    }
    signature
}

/// Links the product to distinct leaves of its bucket, with the canonical
/// URL route, one route per leaf generated this run and the website row.
fn assign_categories(
    state: &mut GeneratorState<'_>,
    product: &NewProduct,
    bucket: &CategoryBucket,
    categories: &CategoryIndex,
    bounds: Bounds,
) {
    let wanted = state.rng.random_range(bounds.min..=bounds.max) as usize;
    let count = wanted.min(bucket.leaves.len());
    let mut picked = rand::seq::index::sample(&mut state.rng, bucket.leaves.len(), count).into_vec();
    picked.sort_unstable();

    let store_id = state.metadata.store_id();
    let suffix = state.metadata.product_url_suffix().to_string();
    let url_key = product.sku.url_key();

    state.output.push(
        TableId::UrlRewrite,
        url_rewrite_row(
            store_id,
            "product",
            product.id,
            format!("{url_key}{suffix}"),
            format!("catalog/product/view/id/{}", product.id),
            SqlValue::Null,
        ),
    );

    for position in picked {
        let category_id = bucket.leaves[position];
        state.output.push(
            TableId::CategoryProduct,
            Row::new()
                .with("category_id", category_id)
                .with("product_id", product.id)
                .with("position", 0_i64),
        );

        if let Some(category_url) = categories.leaf_url(category_id) {
            let metadata = serde_json::json!({ "category_id": category_id.to_string() });
            state.output.push(
                TableId::UrlRewrite,
                url_rewrite_row(
                    store_id,
                    "product",
                    product.id,
                    format!("{category_url}/{url_key}{suffix}"),
                    format!(
                        "catalog/product/view/id/{}/category/{category_id}",
                        product.id
                    ),
                    metadata.to_string().into(),
                ),
            );
        }
    }

    state.output.push(
        TableId::ProductWebsite,
        Row::new()
            .with("product_id", product.id)
            .with("website_id", state.metadata.website_id()),
    );
}
