use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde_json::{Value, json};

use catalogen_config::DatasetConfig;
use catalogen_core::{
    AttributeSetRecord, BackendType, CATALOG_CATEGORY, CATALOG_PRODUCT, CategoryRecord, IdKind,
    MetadataSnapshot, MetadataStore,
};
use catalogen_generate::errors::GenerationError;
use catalogen_generate::{
    GenerationEngine, GenerationReport, MemorySink, OutputWriter, Row, SqlValue, TableId,
};

const TIMESTAMP: i64 = 1_700_000_000;

fn base_document() -> Value {
    json!({
        "prefix": {"code": "oro", "name": "Oro"},
        "customer": {"group": {"count": 0}},
        "seed": 42,
        "output": "dataset.sql",
        "catalog": {
            "attribute": {
                "set": {"count": 2, "regular": {"min": 2, "max": 3}},
                "regular": 4,
                "filterable": 3,
                "options": {"min": 2, "max": 3}
            },
            "category": {"deep": 2, "top": 2, "min": 2, "max": 3},
            "product": {}
        }
    })
}

fn config(document: Value) -> DatasetConfig {
    serde_json::from_value(document).expect("typed config")
}

struct Run {
    report: GenerationReport,
    output: OutputWriter,
    script: MemorySink,
    manifest: MemorySink,
}

fn try_generate(
    document: Value,
    store: &MetadataSnapshot,
) -> Result<Run, GenerationError> {
    let script = MemorySink::new();
    let manifest = MemorySink::new();
    let mut output =
        OutputWriter::from_writers(Box::new(script.clone()), Some(Box::new(manifest.clone())))
            .expect("writer")
            .capture_rows();
    let report = GenerationEngine::new(config(document))
        .with_timestamp(TIMESTAMP)
        .generate(store, &mut output)?;
    Ok(Run {
        report,
        output,
        script,
        manifest,
    })
}

fn generate(document: Value, store: &MetadataSnapshot) -> Run {
    try_generate(document, store).expect("generation succeeds")
}

fn int(row: &Row, column: &str) -> u64 {
    row.get(column)
        .and_then(|value| value.as_int())
        .unwrap_or_else(|| panic!("integer column {column}")) as u64
}

fn text<'r>(row: &'r Row, column: &str) -> &'r str {
    row.get(column)
        .and_then(|value| value.as_text())
        .unwrap_or_else(|| panic!("text column {column}"))
}

fn decimal(row: &Row, column: &str) -> f64 {
    match row.get(column) {
        Some(SqlValue::Decimal(value)) => *value,
        other => panic!("decimal column {column}: {other:?}"),
    }
}

fn attribute_id(store: &MetadataSnapshot, entity_type: &str, code: &str) -> u64 {
    let entity_type_id = store.entity_type_id(entity_type).expect("entity type");
    store
        .attribute_definition(entity_type_id, code)
        .expect("attribute definition")
        .attribute_id
}

/// `row_id -> value` for one attribute across the captured value rows.
fn values_of<'r>(rows: &[&'r Row], attribute: u64) -> HashMap<u64, &'r SqlValue> {
    rows.iter()
        .filter(|row| int(row, "attribute_id") == attribute)
        .map(|row| (int(row, "row_id"), row.get("value").expect("value column")))
        .collect()
}

fn is_whole_cents(amount: f64) -> bool {
    ((amount * 100.0).round() - amount * 100.0).abs() < 1e-6
}

#[test]
fn categories_extend_parent_level_and_path() {
    let mut document = base_document();
    document["catalog"]["category"] = json!({"deep": 3, "top": 2, "min": 2, "max": 2});
    let store = MetadataSnapshot::fresh_install();
    let run = generate(document, &store);

    let root = store.category(2).expect("root category");
    let mut known: HashMap<u64, (u64, String)> = HashMap::new();
    known.insert(root.entity_id, (u64::from(root.level), root.path.clone()));

    let rows = run.output.captured(TableId::CategoryEntity);
    assert_eq!(rows.len(), 2 + 4 + 8);
    for row in rows {
        let id = int(row, "entity_id");
        let (parent_level, parent_path) = known
            .get(&int(row, "parent_id"))
            .cloned()
            .expect("parent emitted before child");
        assert_eq!(int(row, "level"), parent_level + 1);
        assert_eq!(text(row, "path"), format!("{parent_path}/{id}"));
        known.insert(id, (int(row, "level"), text(row, "path").to_string()));
    }

    let leaves = rows.iter().filter(|row| int(row, "children_count") == 0).count();
    assert_eq!(leaves, 8);
}

#[test]
fn missing_top_categories_are_added_after_existing_ones() {
    let mut store = MetadataSnapshot::fresh_install();
    for id in [3, 4] {
        store.categories.push(CategoryRecord {
            entity_id: id,
            parent_id: 2,
            path: format!("1/2/{id}"),
            level: 2,
            position: 1,
            attribute_set_id: 3,
        });
    }
    let mut document = base_document();
    document["catalog"]["category"] = json!({"deep": 2, "top": 5, "min": 1, "max": 1});
    let run = generate(document, &store);

    let tops: Vec<&Row> = run
        .output
        .captured(TableId::CategoryEntity)
        .iter()
        .filter(|row| int(row, "parent_id") == 2)
        .collect();
    assert_eq!(tops.len(), 3);
    assert!(tops.iter().all(|row| int(row, "entity_id") > 4));

    let names: BTreeSet<&str> = run
        .output
        .captured_where(|table| matches!(table, TableId::CategoryValue(_)))
        .into_iter()
        .filter(|row| int(row, "attribute_id") == 45)
        .map(|row| text(row, "value"))
        .collect();
    assert!(names.contains("Top Category 03"));
    assert!(names.contains("Top Category 05"));
    assert!(!names.contains("Top Category 01"));
}

#[test]
fn enough_top_categories_skip_tree_generation() {
    let mut document = base_document();
    document["catalog"]["category"]["top"] = json!(0);
    let run = generate(document, &MetadataSnapshot::fresh_install());

    assert!(run.output.captured(TableId::CategoryEntity).is_empty());
    assert_eq!(run.report.phase("categories").map(|p| p.created), Some(0));
}

#[test]
fn thousand_simple_products_flush_in_two_batches() {
    let mut document = base_document();
    document["catalog"]["category"] = json!({"deep": 1, "top": 3, "min": 1, "max": 1});
    document["catalog"]["product"]["simple"] = json!({
        "count": 1000,
        "price": {"min": 10.0, "max": 90.0}
    });
    let run = generate(document, &MetadataSnapshot::fresh_install());

    assert_eq!(run.output.captured(TableId::ProductEntity).len(), 1000);
    assert_eq!(run.output.captured(TableId::SequenceProduct).len(), 1000);
    assert_eq!(
        run.output
            .stats()
            .get(&TableId::ProductEntity)
            .map(|stats| stats.statements),
        Some(2)
    );
    let statements = run
        .script
        .contents()
        .matches("INSERT INTO `catalog_product_entity` (")
        .count();
    assert_eq!(statements, 2);
    assert_eq!(run.report.phase("simple_products").map(|p| p.created), Some(1000));
}

#[test]
fn products_link_only_leaves_of_their_bucket_and_assigned_attributes() {
    let mut document = base_document();
    document["catalog"]["product"]["category"] = json!({"min": 1, "max": 3});
    document["catalog"]["product"]["simple"] = json!({
        "count": 120,
        "price": {"min": 5.0, "max": 50.0, "special": 30, "group": 40, "tier": 40},
        "inventory": {"min": 1, "max": 100},
        "out_of_stock": 10,
        "disabled": 5
    });
    let store = MetadataSnapshot::fresh_install();
    let run = generate(document, &store);

    let mut top_of: HashMap<u64, u64> = HashMap::new();
    let mut leaves = HashSet::new();
    for row in run.output.captured(TableId::CategoryEntity) {
        let segments: Vec<u64> = text(row, "path")
            .split('/')
            .map(|segment| segment.parse().expect("numeric path"))
            .collect();
        top_of.insert(int(row, "entity_id"), segments[2]);
        if int(row, "children_count") == 0 {
            leaves.insert(int(row, "entity_id"));
        }
    }

    let mut buckets: HashMap<u64, HashSet<u64>> = HashMap::new();
    for row in run.output.captured(TableId::CategoryProduct) {
        let category = int(row, "category_id");
        assert!(leaves.contains(&category), "category {category} is not a leaf");
        buckets
            .entry(int(row, "product_id"))
            .or_default()
            .insert(top_of[&category]);
    }
    assert!(!buckets.is_empty());
    assert!(buckets.values().all(|tops| tops.len() == 1));

    let attribute_floor = store.max_id(IdKind::Attribute).expect("attribute floor");
    let mut assigned: HashMap<u64, HashSet<u64>> = HashMap::new();
    for row in run.output.captured(TableId::EntityAttribute) {
        assigned
            .entry(int(row, "attribute_set_id"))
            .or_default()
            .insert(int(row, "attribute_id"));
    }
    let set_of: HashMap<u64, u64> = run
        .output
        .captured(TableId::ProductEntity)
        .iter()
        .map(|row| (int(row, "entity_id"), int(row, "attribute_set_id")))
        .collect();
    for row in run
        .output
        .captured_where(|table| matches!(table, TableId::ProductValue(_)))
    {
        let attribute = int(row, "attribute_id");
        if attribute <= attribute_floor {
            continue;
        }
        let set = set_of[&int(row, "row_id")];
        assert!(assigned[&set].contains(&attribute));
    }
}

#[test]
fn configurable_children_have_distinct_option_tuples() {
    let mut document = base_document();
    document["catalog"]["attribute"] = json!({
        "set": {"count": 1, "regular": {"min": 3, "max": 3}},
        "regular": 2,
        "filterable": 3,
        "options": {"min": 2, "max": 2}
    });
    document["catalog"]["product"]["simple"] = json!({
        "count": 80,
        "price": {"min": 10.0, "max": 20.0}
    });
    document["catalog"]["product"]["configurable"] = json!({
        "count": 6,
        "attribute": {"min": 2, "max": 2},
        "associated": {"min": 10, "max": 10},
        "price": {"min": 30.0, "max": 40.0}
    });
    let run = generate(document, &MetadataSnapshot::fresh_install());

    let mut selectors: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for row in run.output.captured(TableId::SuperAttribute) {
        selectors
            .entry(int(row, "product_id"))
            .or_default()
            .push(int(row, "attribute_id"));
    }
    let mut values: HashMap<(u64, u64), u64> = HashMap::new();
    for row in run
        .output
        .captured_where(|table| matches!(table, TableId::ProductValue(_)))
    {
        if let Some(value) = row.get("value").and_then(|v| v.as_int()) {
            values.insert((int(row, "row_id"), int(row, "attribute_id")), value as u64);
        }
    }
    let mut children: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for row in run.output.captured(TableId::SuperLink) {
        children
            .entry(int(row, "parent_id"))
            .or_default()
            .push(int(row, "product_id"));
    }

    assert_eq!(selectors.len(), 6);
    assert!(!children.is_empty());
    for (parent, linked) in &children {
        let attributes = &selectors[parent];
        assert_eq!(attributes.len(), 2);
        assert!(linked.len() <= 4);

        let keys: HashSet<Vec<Option<u64>>> = linked
            .iter()
            .map(|child| {
                attributes
                    .iter()
                    .map(|attribute| values.get(&(*child, *attribute)).copied())
                    .collect()
            })
            .collect();
        assert_eq!(keys.len(), linked.len());
    }
}

#[test]
fn grouped_products_link_existing_simple_products() {
    let mut document = base_document();
    document["catalog"]["category"] = json!({"deep": 1, "top": 2, "min": 1, "max": 1});
    document["catalog"]["product"]["simple"] = json!({
        "count": 30,
        "price": {"min": 10.0, "max": 20.0}
    });
    document["catalog"]["product"]["grouped"] = json!({
        "count": 5,
        "associated": {"min": 2, "max": 4}
    });
    let run = generate(document, &MetadataSnapshot::fresh_install());

    let simple: HashSet<u64> = run
        .output
        .captured(TableId::ProductEntity)
        .iter()
        .filter(|row| text(row, "type_id") == "simple")
        .map(|row| int(row, "entity_id"))
        .collect();
    let links = run.output.captured(TableId::ProductLink);
    assert!(links.len() >= 10);
    assert!(links.iter().all(|row| simple.contains(&int(row, "linked_product_id"))));
    assert!(links.iter().all(|row| int(row, "link_type_id") == 3));
    let link_values = run
        .output
        .captured_where(|table| matches!(table, TableId::LinkAttributeValue(_)));
    assert_eq!(link_values.len(), links.len() * 2);

    let parent_of: HashMap<u64, u64> = links
        .iter()
        .map(|row| (int(row, "link_id"), int(row, "product_id")))
        .collect();
    let mut positions: BTreeMap<u64, Vec<i64>> = BTreeMap::new();
    for row in link_values {
        if let Some(position) = row.get("value").and_then(|value| value.as_int()) {
            positions
                .entry(parent_of[&int(row, "link_id")])
                .or_default()
                .push(position);
        }
    }
    assert_eq!(positions.len(), 5);
    for linked in positions.values_mut() {
        linked.sort_unstable();
        let expected: Vec<i64> = (1..=linked.len() as i64).collect();
        assert_eq!(*linked, expected);
    }
}

#[test]
fn grouped_products_without_simple_products_fail() {
    let mut document = base_document();
    document["catalog"]["product"]["grouped"] = json!({
        "count": 5,
        "associated": {"min": 1, "max": 2}
    });

    let result = try_generate(document, &MetadataSnapshot::fresh_install());
    assert!(matches!(result, Err(GenerationError::EmptyPool("grouped"))));
}

#[test]
fn invalid_configuration_is_rejected_before_generation() {
    let mut document = base_document();
    document["catalog"]["category"]["min"] = json!(5);
    document["catalog"]["category"]["max"] = json!(1);

    let result = try_generate(document, &MetadataSnapshot::fresh_install());
    assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
}

#[test]
fn attribute_sets_are_not_recreated() {
    let mut store = MetadataSnapshot::fresh_install();
    let first = generate(base_document(), &store);
    let created = first.output.captured(TableId::AttributeSet);
    assert_eq!(created.len(), 2);

    for row in created {
        store.attribute_sets.push(AttributeSetRecord {
            attribute_set_id: int(row, "attribute_set_id"),
            entity_type_id: int(row, "entity_type_id"),
            attribute_set_name: text(row, "attribute_set_name").to_string(),
            sort_order: int(row, "sort_order") as i64,
        });
    }

    let second = generate(base_document(), &store);
    assert!(second.output.captured(TableId::AttributeSet).is_empty());
    assert_eq!(second.report.phase("attribute_sets").map(|p| p.created), Some(0));
}

#[test]
fn identifiers_start_above_the_store_maximum() {
    let mut store = MetadataSnapshot::fresh_install();
    store.max_ids.insert(IdKind::Product, 5000);
    let mut document = base_document();
    document["catalog"]["product"]["simple"] = json!({
        "count": 50,
        "price": {"min": 1.0, "max": 2.0}
    });
    let run = generate(document, &store);

    let attribute_floor = store.max_id(IdKind::Attribute).expect("floor");
    let attribute_ids: Vec<u64> = run
        .output
        .captured(TableId::Attribute)
        .iter()
        .map(|row| int(row, "attribute_id"))
        .collect();
    assert_eq!(attribute_ids.len(), 7);
    assert!(attribute_ids[0] > attribute_floor);
    assert!(attribute_ids.windows(2).all(|pair| pair[0] < pair[1]));

    let product_ids: Vec<u64> = run
        .output
        .captured(TableId::ProductEntity)
        .iter()
        .map(|row| int(row, "entity_id"))
        .collect();
    assert!(!product_ids.is_empty());
    assert!(product_ids[0] > 5000);
    assert!(product_ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn fixed_seed_reproduces_the_script() {
    let mut document = base_document();
    document["catalog"]["product"]["simple"] = json!({
        "count": 40,
        "price": {"min": 10.0, "max": 20.0, "special": 50, "tier": 50}
    });
    let store = MetadataSnapshot::fresh_install();

    let first = generate(document.clone(), &store);
    let second = generate(document, &store);
    assert_eq!(first.script.contents(), second.script.contents());
    assert_eq!(first.report.seed, 42);
}

#[test]
fn products_without_a_top_category_are_skipped() {
    let mut document = base_document();
    document["catalog"]["category"]["top"] = json!(0);
    document["catalog"]["product"]["simple"] = json!({
        "count": 5,
        "price": {"min": 1.0, "max": 2.0}
    });
    let run = generate(document, &MetadataSnapshot::fresh_install());

    assert!(run.output.captured(TableId::ProductEntity).is_empty());
    let phase = run.report.phase("simple_products").expect("simple phase");
    assert_eq!(phase.created, 0);
    assert_eq!(phase.skipped, 5);
    assert_eq!(run.report.skipped_by_code.get("no_top_category"), Some(&5));
}

#[test]
fn customer_groups_are_topped_up_to_the_target() {
    let store = MetadataSnapshot::fresh_install();
    let existing = store.customer_group_ids().expect("groups").len();
    let mut document = base_document();
    document["customer"]["group"]["count"] = json!(existing + 2);
    let run = generate(document, &store);

    let created = run.output.captured(TableId::CustomerGroup);
    assert_eq!(created.len(), 2);
    let floor = store.max_id(IdKind::CustomerGroup).expect("floor");
    assert!(created.iter().all(|row| int(row, "customer_group_id") > floor));
    assert_eq!(run.report.phase("customer_groups").map(|p| p.created), Some(2));

    let mut document = base_document();
    document["customer"]["group"]["count"] = json!(existing);
    let run = generate(document, &store);
    assert!(run.output.captured(TableId::CustomerGroup).is_empty());
}

#[test]
fn simple_product_prices_follow_their_ratios() {
    let mut document = base_document();
    document["catalog"]["product"]["simple"] = json!({
        "count": 60,
        "price": {"min": 10.0, "max": 20.0, "special": 100, "group": 100, "tier": 100}
    });
    let store = MetadataSnapshot::fresh_install();
    let run = generate(document, &store);

    let decimals = run
        .output
        .captured_where(|table| table == TableId::ProductValue(BackendType::Decimal));
    let prices: HashMap<u64, f64> = values_of(&decimals, attribute_id(&store, CATALOG_PRODUCT, "price"))
        .into_iter()
        .map(|(product, value)| match value {
            SqlValue::Decimal(price) => (product, *price),
            other => panic!("price is {other:?}"),
        })
        .collect();
    assert_eq!(prices.len(), 60);

    let specials = values_of(&decimals, attribute_id(&store, CATALOG_PRODUCT, "special_price"));
    assert!(!specials.is_empty());
    for (product, value) in specials {
        let SqlValue::Decimal(special) = value else {
            panic!("special price is {value:?}");
        };
        let base = prices[&product];
        assert!(*special >= base * 0.60 - 0.005, "{special} below 60% of {base}");
        assert!(*special <= base * 0.95 + 0.005, "{special} above 95% of {base}");
        assert!(is_whole_cents(*special));
    }

    let groups: HashSet<u64> = store.customer_group_ids().expect("groups").into_iter().collect();
    let mut tiers: HashMap<(u64, u32, u64), f64> = HashMap::new();
    for row in run.output.captured(TableId::TierPrice) {
        let product = int(row, "row_id");
        let qty = decimal(row, "qty") as u32;
        let group = int(row, "customer_group_id");
        let value = decimal(row, "value");
        let base = prices[&product];
        assert!(is_whole_cents(value));

        if qty == 1 {
            assert!(groups.contains(&group), "group price for unknown group {group}");
            assert!(value >= base * 0.60 - 0.005 && value <= base * 0.95 + 0.005);
        } else {
            assert!([2, 5, 10].contains(&qty), "unexpected tier quantity {qty}");
            assert!(value >= base * 0.87 - 0.005 && value <= base * 0.98 + 0.005);
            tiers.insert((product, qty, group), value);
        }
    }

    let group_one: Vec<(&(u64, u32, u64), &f64)> =
        tiers.iter().filter(|((_, _, group), _)| *group == 1).collect();
    assert!(!group_one.is_empty());
    for ((product, qty, _), value) in group_one {
        assert_eq!(tiers.get(&(*product, *qty, 0)), Some(value));
    }
}

#[test]
fn stock_and_images_stay_within_bounds() {
    let mut document = base_document();
    document["catalog"]["product"]["image"] = json!({"min": 1, "max": 3, "output": "images.txt"});
    document["catalog"]["product"]["simple"] = json!({
        "count": 40,
        "price": {"min": 10.0, "max": 20.0},
        "inventory": {"min": 5, "max": 15},
        "out_of_stock": 30
    });
    let store = MetadataSnapshot::fresh_install();
    let run = generate(document, &store);

    let stock = run.output.captured(TableId::StockItem);
    assert_eq!(stock.len(), 40);
    let stocked: HashSet<u64> = stock.iter().map(|row| int(row, "product_id")).collect();
    assert_eq!(stocked.len(), 40);
    for row in stock {
        let qty = decimal(row, "qty");
        assert!((5.0..=15.0).contains(&qty));
        assert_eq!(qty.fract(), 0.0);
        assert!(int(row, "is_in_stock") <= 1);
    }

    let gallery = run.output.captured(TableId::MediaGallery);
    let path_of: HashMap<u64, &str> = gallery
        .iter()
        .map(|row| (int(row, "value_id"), text(row, "value")))
        .collect();
    let manifest = run.manifest.contents();
    let manifest_lines: Vec<&str> = manifest.lines().collect();
    let gallery_paths: Vec<&str> = gallery.iter().map(|row| text(row, "value")).collect();
    assert_eq!(manifest_lines, gallery_paths);

    let mut images: HashMap<u64, u32> = HashMap::new();
    let mut first: HashMap<u64, &str> = HashMap::new();
    for row in run.output.captured(TableId::MediaGalleryValue) {
        let product = int(row, "row_id");
        *images.entry(product).or_default() += 1;
        if int(row, "position") == 1 {
            first.insert(product, path_of[&int(row, "value_id")]);
        }
    }
    assert_eq!(images.len(), 40);
    assert!(images.values().all(|count| (1..=3).contains(count)));

    let varchars = run
        .output
        .captured_where(|table| table == TableId::ProductValue(BackendType::Varchar));
    for code in ["image", "small_image", "thumbnail"] {
        let values = values_of(&varchars, attribute_id(&store, CATALOG_PRODUCT, code));
        assert_eq!(values.len(), 40);
        for (product, value) in values {
            assert_eq!(value.as_text(), Some(first[&product]), "{code} of {product}");
        }
    }
}

#[test]
fn category_links_get_a_route_under_the_leaf_url() {
    let mut document = base_document();
    document["catalog"]["product"]["category"] = json!({"min": 1, "max": 2});
    document["catalog"]["product"]["simple"] = json!({
        "count": 30,
        "price": {"min": 10.0, "max": 20.0}
    });
    let store = MetadataSnapshot::fresh_install();
    let run = generate(document, &store);

    let category_varchars = run
        .output
        .captured_where(|table| table == TableId::CategoryValue(BackendType::Varchar));
    let leaf_urls = values_of(&category_varchars, attribute_id(&store, CATALOG_CATEGORY, "url_path"));
    let product_varchars = run
        .output
        .captured_where(|table| table == TableId::ProductValue(BackendType::Varchar));
    let url_keys = values_of(&product_varchars, attribute_id(&store, CATALOG_PRODUCT, "url_key"));

    let routes: HashSet<(u64, &str, &str)> = run
        .output
        .captured(TableId::UrlRewrite)
        .iter()
        .filter(|row| text(row, "entity_type") == "product")
        .map(|row| {
            (
                int(row, "entity_id"),
                text(row, "request_path"),
                text(row, "target_path"),
            )
        })
        .collect();

    let links = run.output.captured(TableId::CategoryProduct);
    assert!(links.len() >= 30);
    for row in links {
        let product = int(row, "product_id");
        let category = int(row, "category_id");
        let leaf_url = leaf_urls[&category].as_text().expect("url path");
        let url_key = url_keys[&product].as_text().expect("url key");
        let request = format!("{leaf_url}/{url_key}.html");
        let target = format!("catalog/product/view/id/{product}/category/{category}");
        assert!(
            routes.contains(&(product, request.as_str(), target.as_str())),
            "missing route {request} for product {product}"
        );
    }
}

#[test]
fn configurable_products_only_carry_a_base_price() {
    let mut document = base_document();
    document["catalog"]["attribute"] = json!({
        "set": {"count": 1, "regular": {"min": 3, "max": 3}},
        "regular": 2,
        "filterable": 3,
        "options": {"min": 2, "max": 2}
    });
    document["catalog"]["product"]["simple"] = json!({
        "count": 30,
        "price": {"min": 10.0, "max": 20.0}
    });
    document["catalog"]["product"]["configurable"] = json!({
        "count": 4,
        "attribute": {"min": 1, "max": 2},
        "associated": {"min": 2, "max": 4},
        "price": {"min": 30.0, "max": 40.0, "special": 100, "group": 100, "tier": 100}
    });
    let store = MetadataSnapshot::fresh_install();
    let run = generate(document, &store);

    let configurable: HashSet<u64> = run
        .output
        .captured(TableId::ProductEntity)
        .iter()
        .filter(|row| text(row, "type_id") == "configurable")
        .map(|row| int(row, "entity_id"))
        .collect();
    assert_eq!(configurable.len(), 4);
    assert!(
        run.output
            .captured(TableId::TierPrice)
            .iter()
            .all(|row| !configurable.contains(&int(row, "row_id")))
    );

    let price_id = attribute_id(&store, CATALOG_PRODUCT, "price");
    let decimals: Vec<&Row> = run
        .output
        .captured_where(|table| table == TableId::ProductValue(BackendType::Decimal))
        .into_iter()
        .filter(|row| configurable.contains(&int(row, "row_id")))
        .collect();
    assert_eq!(decimals.len(), 4);
    assert!(decimals.iter().all(|row| int(row, "attribute_id") == price_id));
}
