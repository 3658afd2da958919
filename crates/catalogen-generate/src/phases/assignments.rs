use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::errors::GenerationError;
use crate::output::TableId;
use crate::phases::attribute_sets::entity_attribute_row;
use crate::phases::attributes::AttributeCatalog;
use crate::state::GeneratorState;

pub const PHASE: &str = "assignments";

/// Custom attributes placed in each prefixed attribute set, in sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetAssignments {
    by_set: BTreeMap<u64, Vec<u64>>,
}

impl SetAssignments {
    pub fn attributes(&self, set_id: u64) -> Result<&[u64], GenerationError> {
        self.by_set
            .get(&set_id)
            .map(Vec::as_slice)
            .ok_or(GenerationError::MissingAssignment(set_id))
    }

    pub fn sets(&self) -> impl Iterator<Item = u64> + '_ {
        self.by_set.keys().copied()
    }
}

/// Fills every owned group that has no attributes yet.
///
/// The regular and filterable pools are shuffled and a random-length
/// prefix of each is assigned, regular attributes first.
pub fn generate(
    state: &mut GeneratorState<'_>,
    owned_groups: &BTreeMap<u64, u64>,
    catalog: &AttributeCatalog,
) -> Result<SetAssignments, GenerationError> {
    let started = state.enter_phase(PHASE);
    let product_type = state.metadata.product_type_id();
    let group_ids: Vec<u64> = owned_groups.values().copied().collect();

    let mut existing = state.metadata.store().entity_attributes(&group_ids)?;
    existing.sort_by_key(|record| (record.attribute_set_id, record.sort_order));

    let mut by_set: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for record in existing {
        by_set
            .entry(record.attribute_set_id)
            .or_default()
            .push(record.attribute_id);
    }

    let set_config = &state.config.catalog.attribute.set;
    let regular_bounds = set_config.regular;
    let filterable_bounds = set_config.filterable_bounds();
    let mut regular = catalog.regular_ids();
    let mut filterable = catalog.filterable_ids();

    let mut created = 0;
    for (&set_id, &group_id) in owned_groups {
        if by_set.get(&set_id).is_some_and(|attributes| !attributes.is_empty()) {
            continue;
        }

        let regular_count = state
            .rng
            .random_range(regular_bounds.min..=regular_bounds.max) as usize;
        let filterable_count = state
            .rng
            .random_range(filterable_bounds.min..=filterable_bounds.max)
            as usize;
        regular.shuffle(&mut state.rng);
        filterable.shuffle(&mut state.rng);

        let attributes: Vec<u64> = regular
            .iter()
            .take(regular_count)
            .chain(filterable.iter().take(filterable_count))
            .copied()
            .collect();

        for (position, attribute_id) in attributes.iter().enumerate() {
            state.output.push(
                TableId::EntityAttribute,
                entity_attribute_row(
                    product_type,
                    set_id,
                    group_id,
                    *attribute_id,
                    position as i64 + 1,
                ),
            );
            created += 1;
        }
        by_set.insert(set_id, attributes);
    }

    state.finish_phase(PHASE, started, created, 0)?;
    Ok(SetAssignments { by_set })
}
