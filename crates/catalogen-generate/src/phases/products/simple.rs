use rand::Rng;

use crate::errors::GenerationError;
use crate::phases::products::{
    ProductInputs, ProductKind, SimplePools, SimpleVariant, create_product, pricing,
    push_attribute_value, push_custom_attributes, run_products,
};
use crate::state::GeneratorState;

pub const PHASE: &str = "simple_products";

/// Generates the simple products and collects the pools the composite
/// product phases draw their children from.
pub fn generate(
    state: &mut GeneratorState<'_>,
    inputs: ProductInputs<'_>,
) -> Result<SimplePools, GenerationError> {
    let started = state.enter_phase(PHASE);
    let dataset = state.config;
    let product = &dataset.catalog.product;
    let mut pools = SimplePools::default();
    let Some(config) = product.simple.as_ref() else {
        state.finish_phase(PHASE, started, 0, 0)?;
        return Ok(pools);
    };
    let collect_global = product.grouped.as_ref().is_some_and(|g| g.common.count > 0);
    let collect_variants = product
        .configurable
        .as_ref()
        .is_some_and(|c| c.common.count > 0);

    let (created, skipped) = run_products(
        state,
        ProductKind::Simple,
        config.common.count,
        inputs.categories,
        |state, bucket, index| {
            let product = create_product(
                state,
                ProductKind::Simple,
                &config.common,
                bucket,
                inputs.categories,
                index,
            )?;
            pricing::push_prices(state, product.id, &config.price, inputs.customer_groups)?;
            let weight = f64::from(state.rng.random_range(10..=200_u32)) / 100.0;
            push_attribute_value(state, product.id, "weight", weight.into())?;

            let assigned = inputs.assignments.attributes(product.attribute_set_id)?;
            let signature =
                push_custom_attributes(state, product.id, assigned, inputs.attributes, |_| true);

            if collect_global {
                pools.push_global(product.id);
            }
            if collect_variants {
                pools.push_variant(
                    product.attribute_set_id,
                    SimpleVariant {
                        product_id: product.id,
                        signature,
                    },
                );
            }
            Ok(())
        },
    )?;

    state.finish_phase(PHASE, started, created, skipped)?;
    Ok(pools)
}
