use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{ConfigError, ValidationIssue, ValidationReport};
use crate::model::{Bounds, DatasetConfig, PriceConfig, ProductCommon};

/// Configuration that passed every validation pass, with its warnings.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: DatasetConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// JSON Schema of the configuration document, derived from the typed model.
pub fn config_json_schema() -> Result<Value, ConfigError> {
    let schema = schemars::schema_for!(DatasetConfig);
    Ok(serde_json::to_value(schema)?)
}

/// Validate a raw configuration document against the configuration schema.
pub fn validate_config_json(document: &Value) -> Result<ValidationReport, ConfigError> {
    let schema = config_json_schema()?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(document) {
        for error in errors {
            let path = error.instance_path.to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }
    Ok(report)
}

/// Run the structural, typed and semantic passes over a document.
pub fn validate_document(document: Value) -> Result<ValidatedConfig, ConfigError> {
    let structural = validate_config_json(&document)?;
    if !structural.is_ok() {
        return Err(ConfigError::Invalid(structural));
    }

    let config: DatasetConfig = serde_json::from_value(document)?;
    let report = validate_config(&config);
    if !report.is_ok() {
        return Err(ConfigError::Invalid(report));
    }

    Ok(ValidatedConfig {
        config,
        warnings: report.warnings,
    })
}

/// Semantic checks the schema cannot express.
pub fn validate_config(config: &DatasetConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.prefix.code.trim().is_empty() {
        report.push(ValidationIssue::error(
            "prefix_empty",
            "/prefix/code",
            "prefix code must not be empty",
        ));
    }
    if config.prefix.name.trim().is_empty() {
        report.push(ValidationIssue::error(
            "prefix_empty",
            "/prefix/name",
            "prefix name must not be empty",
        ));
    }
    if config.output.as_os_str().is_empty() {
        report.push(ValidationIssue::error(
            "output_missing",
            "/output",
            "output file path must be set",
        ));
    }
    if config.batch_size == 0 {
        report.push(ValidationIssue::error(
            "batch_size_zero",
            "/batch_size",
            "batch_size must be greater than zero",
        ));
    }

    let attribute = &config.catalog.attribute;
    check_bounds(&mut report, "/catalog/attribute/options", attribute.options);
    check_bounds(&mut report, "/catalog/attribute/set/regular", attribute.set.regular);
    if let Some(filterable) = attribute.set.filterable {
        check_bounds(&mut report, "/catalog/attribute/set/filterable", filterable);
    }
    if attribute.filterable > 0 && attribute.options.max == 0 {
        report.push(ValidationIssue::warning(
            "select_without_options",
            "/catalog/attribute/options/max",
            "filterable attributes will be created without options",
        ));
    }

    let category = &config.catalog.category;
    if category.deep == 0 {
        report.push(ValidationIssue::error(
            "category_depth_zero",
            "/catalog/category/deep",
            "category depth must be at least 1",
        ));
    }
    check_bounds(&mut report, "/catalog/category", category.children());
    if category.deep > 1 && category.max == 0 {
        report.push(ValidationIssue::warning(
            "no_leaf_categories",
            "/catalog/category/max",
            "no category reaches the configured depth; every product will be skipped",
        ));
    }

    let product = &config.catalog.product;
    check_bounds(&mut report, "/catalog/product/category", product.category);

    if let Some(simple) = &product.simple {
        check_common(&mut report, "/catalog/product/simple", &simple.common);
        check_price(&mut report, "/catalog/product/simple/price", &simple.price);
    }

    let simple_pool_empty = product
        .simple
        .as_ref()
        .is_none_or(|simple| simple.common.count == 0);

    if let Some(grouped) = &product.grouped {
        check_common(&mut report, "/catalog/product/grouped", &grouped.common);
        check_bounds(
            &mut report,
            "/catalog/product/grouped/associated",
            grouped.associated,
        );
        if simple_pool_empty && grouped.common.count > 0 {
            report.push(ValidationIssue::warning(
                "empty_simple_pool",
                "/catalog/product/grouped",
                "grouped products need simple products to associate",
            ));
        }
    }

    if let Some(configurable) = &product.configurable {
        check_common(&mut report, "/catalog/product/configurable", &configurable.common);
        check_bounds(
            &mut report,
            "/catalog/product/configurable/attribute",
            configurable.attribute,
        );
        check_bounds(
            &mut report,
            "/catalog/product/configurable/associated",
            configurable.associated,
        );
        check_price(
            &mut report,
            "/catalog/product/configurable/price",
            &configurable.price,
        );
        if simple_pool_empty && configurable.common.count > 0 {
            report.push(ValidationIssue::warning(
                "empty_simple_pool",
                "/catalog/product/configurable",
                "configurable products need simple products to associate",
            ));
        }
        if configurable.attribute.min > attribute.filterable {
            report.push(ValidationIssue::warning(
                "super_attributes_capped",
                "/catalog/product/configurable/attribute/min",
                format!(
                    "only {} filterable attributes exist; super attributes are capped",
                    attribute.filterable
                ),
            ));
        }
    }

    if let Some(image) = &product.image {
        check_bounds(&mut report, "/catalog/product/image", image.bounds());
        if image.output.as_os_str().is_empty() {
            report.push(ValidationIssue::error(
                "output_missing",
                "/catalog/product/image/output",
                "image manifest path must be set",
            ));
        }
    }

    report
}

fn check_bounds(report: &mut ValidationReport, path: &str, bounds: Bounds) {
    if !bounds.is_ordered() {
        report.push(ValidationIssue::error(
            "range_inverted",
            path,
            format!("min ({}) is greater than max ({})", bounds.min, bounds.max),
        ));
    }
}

fn check_percent(report: &mut ValidationReport, path: String, value: u32) {
    if value > 100 {
        report.push(ValidationIssue::error(
            "percent_out_of_range",
            path,
            format!("{value} is not a percentage"),
        ));
    }
}

fn check_common(report: &mut ValidationReport, base: &str, common: &ProductCommon) {
    check_percent(report, format!("{base}/disabled"), common.disabled);
    check_percent(report, format!("{base}/out_of_stock"), common.out_of_stock);
    if let Some(inventory) = common.inventory {
        check_bounds(report, &format!("{base}/inventory"), inventory);
    }
    if let Some(category) = common.category {
        check_bounds(report, &format!("{base}/category"), category);
    }
}

fn check_price(report: &mut ValidationReport, base: &str, price: &PriceConfig) {
    if price.min < 0.0 || price.max < price.min {
        report.push(ValidationIssue::error(
            "price_range_invalid",
            base,
            format!("price range {}..{} is invalid", price.min, price.max),
        ));
    }
    check_percent(report, format!("{base}/special"), price.special);
    check_percent(report, format!("{base}/group"), price.group);
    check_percent(report, format!("{base}/tier"), price.tier);
}
