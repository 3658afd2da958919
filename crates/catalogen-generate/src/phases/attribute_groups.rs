use std::collections::BTreeMap;

use catalogen_core::IdKind;

use crate::errors::GenerationError;
use crate::output::{SqlValue, TableId};
use crate::phases::attribute_sets::{ProductSets, group_row};
use crate::state::GeneratorState;

pub const PHASE: &str = "attribute_groups";

/// Ensures every prefixed set owns a `<Prefix>` group.
///
/// Returns attribute set id to owned group id.
pub fn generate(
    state: &mut GeneratorState<'_>,
    sets: &ProductSets,
) -> Result<BTreeMap<u64, u64>, GenerationError> {
    let started = state.enter_phase(PHASE);
    let prefix = &state.config.prefix;
    let product_type = state.metadata.product_type_id();

    let mut owned: BTreeMap<u64, u64> = state
        .metadata
        .store()
        .attribute_groups_named(product_type, &prefix.name)?
        .into_iter()
        .map(|group| (group.attribute_set_id, group.attribute_group_id))
        .collect();

    let set_ids = sets.ids();
    owned.retain(|set_id, _| set_ids.contains(set_id));

    let mut created = 0;
    for &set_id in &set_ids {
        if owned.contains_key(&set_id) {
            continue;
        }
        let group_id = state.ids.next(IdKind::AttributeGroup);
        state.output.push(
            TableId::AttributeGroup,
            group_row(
                group_id,
                set_id,
                &prefix.name,
                &prefix.code,
                SqlValue::from("basic"),
                10,
                0,
            ),
        );
        owned.insert(set_id, group_id);
        created += 1;
    }

    state.finish_phase(PHASE, started, created, 0)?;
    Ok(owned)
}
