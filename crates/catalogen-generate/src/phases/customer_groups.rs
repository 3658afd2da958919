use catalogen_core::IdKind;
use tracing::info;

use crate::errors::GenerationError;
use crate::output::{Row, TableId};
use crate::state::GeneratorState;

pub const PHASE: &str = "customer_groups";

/// Tops the customer groups up to `customer.group.count`.
///
/// Returns every non-zero group id, existing ones first; they drive the
/// group and tier price rows of the product phase.
pub fn generate(state: &mut GeneratorState<'_>) -> Result<Vec<u64>, GenerationError> {
    let started = state.enter_phase(PHASE);
    let mut groups = state.metadata.store().customer_group_ids()?;
    let existing = groups.len() as u32;
    let target = state.config.customer.group.count;

    if target == 0 || existing >= target {
        info!(existing, target, "customer groups already exist");
        state.finish_phase(PHASE, started, 0, 0)?;
        return Ok(groups);
    }

    let name = &state.config.prefix.name;
    let mut created = 0;
    for i in existing + 1..=target {
        let group_id = state.ids.next(IdKind::CustomerGroup);
        state.output.push(
            TableId::CustomerGroup,
            Row::new()
                .with("customer_group_id", group_id)
                .with("customer_group_code", format!("{name} Group {i:02}"))
                .with("tax_class_id", 0_i64),
        );
        groups.push(group_id);
        created += 1;
    }

    state.finish_phase(PHASE, started, created, 0)?;
    Ok(groups)
}
