use catalogen_core::{IdKind, LINK_TYPE_GROUPED};
use rand::Rng;
use rand::seq::index::sample;

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::phases::products::{
    ProductInputs, ProductKind, SimplePools, create_product, push_custom_attributes,
    run_products,
};
use crate::state::GeneratorState;

pub const PHASE: &str = "grouped_products";

/// Generates grouped products linking distinct simple products.
pub fn generate(
    state: &mut GeneratorState<'_>,
    inputs: ProductInputs<'_>,
    pools: &SimplePools,
) -> Result<(), GenerationError> {
    let started = state.enter_phase(PHASE);
    let dataset = state.config;
    let Some(config) = dataset.catalog.product.grouped.as_ref() else {
        state.finish_phase(PHASE, started, 0, 0)?;
        return Ok(());
    };
    if config.common.count > 0 && pools.all().is_empty() {
        return Err(GenerationError::EmptyPool("grouped"));
    }
    let link_attributes = state.metadata.grouped_link_attributes()?.to_vec();

    let (created, skipped) = run_products(
        state,
        ProductKind::Grouped,
        config.common.count,
        inputs.categories,
        |state, bucket, index| {
            let product = create_product(
                state,
                ProductKind::Grouped,
                &config.common,
                bucket,
                inputs.categories,
                index,
            )?;
            let assigned = inputs.assignments.attributes(product.attribute_set_id)?;
            push_custom_attributes(state, product.id, assigned, inputs.attributes, |_| true);

            let candidates = pools.all();
            let wanted = state
                .rng
                .random_range(config.associated.min..=config.associated.max)
                as usize;
            let picked = sample(&mut state.rng, candidates.len(), wanted.min(candidates.len()));

            for (position, slot) in picked.iter().enumerate() {
                let child_id = candidates[slot];
                state.output.push(
                    TableId::ProductRelation,
                    Row::new()
                        .with("parent_id", product.id)
                        .with("child_id", child_id),
                );

                let link_id = state.ids.next(IdKind::ProductLink);
                state.output.push(
                    TableId::ProductLink,
                    Row::new()
                        .with("link_id", link_id)
                        .with("product_id", product.id)
                        .with("linked_product_id", child_id)
                        .with("link_type_id", LINK_TYPE_GROUPED),
                );

                for attribute in &link_attributes {
                    let value = match attribute.code.as_str() {
                        "position" => SqlValue::from(position as i64 + 1),
                        "qty" => SqlValue::Decimal(f64::from(state.rng.random_range(0..=1_u32))),
                        _ => continue,
                    };
                    state.output.push(
                        TableId::LinkAttributeValue(attribute.data_type),
                        Row::new()
                            .with("value_id", SqlValue::Null)
                            .with("product_link_attribute_id", attribute.link_attribute_id)
                            .with("link_id", link_id)
                            .with("value", value),
                    );
                }
            }
            Ok(())
        },
    )?;

    state.finish_phase(PHASE, started, created, skipped)?;
    Ok(())
}
