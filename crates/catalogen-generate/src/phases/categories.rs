use std::collections::HashMap;

use catalogen_core::{BackendType, CategoryRecord, IdKind};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::state::GeneratorState;

pub const PHASE: &str = "categories";

const CREATED_AT: &str = "2015-01-01 00:00:00";

/// One category of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: u64,
    pub parent_id: u64,
    pub path: String,
    pub level: u32,
    pub position: u32,
    pub attribute_set_id: u64,
    /// Known only for categories generated in this run.
    pub url_path: Option<String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Category subtree below the configured root, stored as an arena with
/// explicit parent and child indexes.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    by_id: HashMap<u64, usize>,
}

impl CategoryTree {
    /// Builds the tree from the root and its descendants.
    ///
    /// `subtree` must be ordered by level so parents precede children;
    /// rows whose parent is unknown are ignored.
    pub fn load(root: CategoryRecord, subtree: Vec<CategoryRecord>) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(subtree.len() + 1),
            by_id: HashMap::new(),
        };
        tree.push(root, None, None);

        for record in subtree {
            match tree.by_id.get(&record.parent_id).copied() {
                Some(parent) => {
                    tree.push(record, Some(parent), None);
                }
                None => {
                    debug!(category = record.entity_id, "category parent outside subtree");
                }
            }
        }
        tree
    }

    pub fn root(&self) -> &CategoryNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &CategoryNode {
        &self.nodes[index]
    }

    pub fn get(&self, id: u64) -> Option<&CategoryNode> {
        self.by_id.get(&id).map(|index| &self.nodes[*index])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth below the root: top-level categories are at depth 1.
    pub fn depth(&self, index: usize) -> u32 {
        self.nodes[index].level - self.nodes[0].level
    }

    pub fn children(&self, index: usize) -> &[usize] {
        &self.nodes[index].children
    }

    pub fn top_level(&self) -> &[usize] {
        self.children(0)
    }

    /// Appends a child with level and path derived from the parent.
    pub fn insert_child(
        &mut self,
        parent: usize,
        id: u64,
        position: u32,
        url_path: String,
    ) -> usize {
        let parent_node = &self.nodes[parent];
        let record = CategoryRecord {
            entity_id: id,
            parent_id: parent_node.id,
            path: format!("{}/{id}", parent_node.path),
            level: parent_node.level + 1,
            position,
            attribute_set_id: parent_node.attribute_set_id,
        };
        self.push(record, Some(parent), Some(url_path))
    }

    fn push(
        &mut self,
        record: CategoryRecord,
        parent: Option<usize>,
        url_path: Option<String>,
    ) -> usize {
        let index = self.nodes.len();
        self.by_id.insert(record.entity_id, index);
        self.nodes.push(CategoryNode {
            id: record.entity_id,
            parent_id: record.parent_id,
            path: record.path,
            level: record.level,
            position: record.position,
            attribute_set_id: record.attribute_set_id,
            url_path,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        index
    }

    /// Indexes the leaves (categories at depth `deep`) of every top-level
    /// branch and maps product attribute sets onto branches round-robin.
    pub fn index(&self, deep: u32, attribute_sets: &[u64]) -> CategoryIndex {
        let mut buckets = Vec::new();
        let mut leaf_urls = HashMap::new();

        for (i, &top) in self.top_level().iter().enumerate() {
            let mut leaves = Vec::new();
            let mut stack = vec![top];
            while let Some(index) = stack.pop() {
                let depth = self.depth(index);
                if depth == deep {
                    let node = &self.nodes[index];
                    leaves.push(node.id);
                    if let Some(url) = &node.url_path {
                        leaf_urls.insert(node.id, url.clone());
                    }
                } else if depth < deep {
                    stack.extend(self.nodes[index].children.iter().rev());
                }
            }

            let attribute_set_id = if attribute_sets.is_empty() {
                None
            } else {
                Some(attribute_sets[i % attribute_sets.len()])
            };
            buckets.push(CategoryBucket {
                top_id: self.nodes[top].id,
                attribute_set_id,
                leaves,
            });
        }

        CategoryIndex { buckets, leaf_urls }
    }
}

/// A top-level branch with its leaves and product attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBucket {
    pub top_id: u64,
    pub attribute_set_id: Option<u64>,
    pub leaves: Vec<u64>,
}

/// Product-facing view of the category tree.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    buckets: Vec<CategoryBucket>,
    leaf_urls: HashMap<u64, String>,
}

impl CategoryIndex {
    pub fn buckets(&self) -> &[CategoryBucket] {
        &self.buckets
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&CategoryBucket> {
        self.buckets.choose(rng)
    }

    /// URL path of a leaf generated in this run.
    pub fn leaf_url(&self, category_id: u64) -> Option<&str> {
        self.leaf_urls.get(&category_id).map(String::as_str)
    }

    pub fn leaf_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.leaves.len()).sum()
    }
}

/// Loads the subtree below the configured root and generates the
/// top-level branches still missing.
pub fn generate(
    state: &mut GeneratorState<'_>,
    attribute_sets: &[u64],
) -> Result<CategoryIndex, GenerationError> {
    let started = state.enter_phase(PHASE);
    let config = &state.config.catalog.category;
    let (deep, top, root_id) = (config.deep, config.top, config.root);

    let store = state.metadata.store();
    let root = store.category(root_id)?;
    let subtree = store.category_subtree(&root.path)?;
    let mut tree = CategoryTree::load(root, subtree);

    let existing = tree.top_level().len() as u32;
    let mut created = 0;
    if top <= existing {
        info!(existing, top, "categories loaded");
    } else {
        for i in existing + 1..=top {
            let name = format!("Top Category {i:02}");
            let url_key = format!("top-cat-{i:02}");
            let node = create_category(state, &mut tree, 0, i, name, url_key)?;
            created += 1;
            created += generate_children(state, &mut tree, node, i)?;
            state.output.flush_all()?;
        }
    }

    let index = tree.index(deep, attribute_sets);
    info!(
        buckets = index.buckets().len(),
        leaves = index.leaf_count(),
        "category index built"
    );
    state.finish_phase(PHASE, started, created, 0)?;
    Ok(index)
}

fn generate_children(
    state: &mut GeneratorState<'_>,
    tree: &mut CategoryTree,
    parent: usize,
    parent_position: u32,
) -> Result<u64, GenerationError> {
    let depth = tree.depth(parent) + 1;
    let children = state.config.catalog.category.children();
    if depth > state.config.catalog.category.deep {
        return Ok(0);
    }

    let count = state.rng.random_range(children.min..=children.max);
    let mut created = 0;
    for j in 1..=count {
        let name = format!("Category Lev {depth:02} {parent_position:02}/{j:02}");
        let url_key = format!("cat-{depth:02}-{parent_position:02}-{j:02}");
        let node = create_category(state, tree, parent, j, name, url_key)?;
        created += 1 + generate_children(state, tree, node, j)?;
    }
    Ok(created)
}

fn create_category(
    state: &mut GeneratorState<'_>,
    tree: &mut CategoryTree,
    parent: usize,
    position: u32,
    name: String,
    url_key: String,
) -> Result<usize, GenerationError> {
    let url_path = match &tree.node(parent).url_path {
        Some(prefix) if tree.depth(parent) > 0 => format!("{prefix}/{url_key}"),
        _ => url_key.clone(),
    };
    let id = state.ids.next(IdKind::Category);
    let index = tree.insert_child(parent, id, position, url_path.clone());
    let node = tree.node(index);
    let has_children = tree.depth(index) < state.config.catalog.category.deep;

    state.output.push(
        TableId::CategoryEntity,
        Row::new()
            .with("entity_id", id)
            .with("created_in", 1_i64)
            .with("updated_in", state.timestamp)
            .with("attribute_set_id", node.attribute_set_id)
            .with("parent_id", node.parent_id)
            .with("created_at", CREATED_AT)
            .with("updated_at", CREATED_AT)
            .with("path", node.path.as_str())
            .with("position", position)
            .with("level", node.level)
            .with("children_count", i64::from(has_children)),
    );

    let values: [(&str, SqlValue); 9] = [
        ("name", name.into()),
        ("custom_apply_to_products", 0_i64.into()),
        ("custom_use_parent_settings", 0_i64.into()),
        ("display_mode", "PRODUCTS".into()),
        ("include_in_menu", 1_i64.into()),
        ("is_active", 1_i64.into()),
        ("is_anchor", 1_i64.into()),
        ("url_key", url_key.into()),
        ("url_path", url_path.as_str().into()),
    ];
    for (code, value) in values {
        let attribute = state.metadata.category_attribute(code)?;
        if attribute.backend_type == BackendType::Static {
            continue;
        }
        state.output.push(
            TableId::CategoryValue(attribute.backend_type),
            Row::new()
                .with("value_id", SqlValue::Null)
                .with("attribute_id", attribute.attribute_id)
                .with("store_id", 0_i64)
                .with("row_id", id)
                .with("value", value),
        );
    }

    state.output.push(
        TableId::UrlRewrite,
        url_rewrite_row(
            state.metadata.store_id(),
            "category",
            id,
            format!("{url_path}{}", state.metadata.category_url_suffix()),
            format!("catalog/category/view/id/{id}"),
            SqlValue::Null,
        ),
    );

    Ok(index)
}

pub(crate) fn url_rewrite_row(
    store_id: u64,
    entity_type: &str,
    entity_id: u64,
    request_path: String,
    target_path: String,
    metadata: SqlValue,
) -> Row {
    Row::new()
        .with("redirect_type", 0_i64)
        .with("is_autogenerated", 1_i64)
        .with("metadata", metadata)
        .with("description", SqlValue::Null)
        .with("store_id", store_id)
        .with("entity_type", entity_type)
        .with("entity_id", entity_id)
        .with("request_path", request_path)
        .with("target_path", target_path)
}
