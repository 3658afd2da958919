use std::collections::HashSet;

use catalogen_core::IdKind;
use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index::sample;
use tracing::debug;

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::phases::products::{
    ProductInputs, ProductKind, SimplePools, SimpleVariant, create_product, pricing,
    push_custom_attributes, run_products,
};
use crate::state::GeneratorState;

pub const PHASE: &str = "configurable_products";

/// Generates configurable products over filterable super attributes.
///
/// Children come from the simple products of the same attribute set; no
/// two children of a product share the same options across its super
/// attributes.
pub fn generate(
    state: &mut GeneratorState<'_>,
    inputs: ProductInputs<'_>,
    pools: &SimplePools,
) -> Result<(), GenerationError> {
    let started = state.enter_phase(PHASE);
    let dataset = state.config;
    let Some(config) = dataset.catalog.product.configurable.as_ref() else {
        state.finish_phase(PHASE, started, 0, 0)?;
        return Ok(());
    };
    if config.common.count > 0 && !pools.has_variants() {
        return Err(GenerationError::EmptyPool("configurable"));
    }

    let (created, skipped) = run_products(
        state,
        ProductKind::Configurable,
        config.common.count,
        inputs.categories,
        |state, bucket, index| {
            let product = create_product(
                state,
                ProductKind::Configurable,
                &config.common,
                bucket,
                inputs.categories,
                index,
            )?;
            pricing::push_base_price(state, product.id, &config.price)?;

            let assigned = inputs.assignments.attributes(product.attribute_set_id)?;
            push_custom_attributes(state, product.id, assigned, inputs.attributes, |filterable| {
                !filterable
            });

            let filterable: Vec<u64> = assigned
                .iter()
                .copied()
                .filter(|id| inputs.attributes.get(*id).is_some_and(|a| a.is_filterable))
                .collect();
            let wanted = state
                .rng
                .random_range(config.attribute.min..=config.attribute.max)
                as usize;
            let mut slots =
                sample(&mut state.rng, filterable.len(), wanted.min(filterable.len())).into_vec();
            slots.sort_unstable();
            let selectors: Vec<u64> = slots.into_iter().map(|slot| filterable[slot]).collect();

            for attribute_id in &selectors {
                let super_id = state.ids.next(IdKind::SuperAttribute);
                state.output.push(
                    TableId::SuperAttribute,
                    Row::new()
                        .with("product_super_attribute_id", super_id)
                        .with("product_id", product.id)
                        .with("attribute_id", *attribute_id)
                        .with("position", 0_i64),
                );
                let label = inputs
                    .attributes
                    .get(*attribute_id)
                    .map(|a| a.frontend_label.clone());
                state.output.push(
                    TableId::SuperAttributeLabel,
                    Row::new()
                        .with("value_id", SqlValue::Null)
                        .with("product_super_attribute_id", super_id)
                        .with("store_id", 0_i64)
                        .with("use_default", 1_i64)
                        .with("value", label),
                );
            }

            let variants = pools.variants(product.attribute_set_id);
            if variants.is_empty() {
                debug!(
                    product = product.id,
                    set = product.attribute_set_id,
                    "no simple products in attribute set"
                );
                return Ok(());
            }
            let wanted = state
                .rng
                .random_range(config.associated.min..=config.associated.max)
                as usize;
            for child in pick_children(&mut state.rng, variants, &selectors, wanted) {
                state.output.push(
                    TableId::ProductRelation,
                    Row::new()
                        .with("parent_id", product.id)
                        .with("child_id", child),
                );
                state.output.push(
                    TableId::SuperLink,
                    Row::new()
                        .with("link_id", SqlValue::Null)
                        .with("product_id", child)
                        .with("parent_id", product.id),
                );
            }
            Ok(())
        },
    )?;

    state.finish_phase(PHASE, started, created, skipped)?;
    Ok(())
}

/// Up to `wanted` distinct variants whose option tuples over `selectors`
/// are pairwise different, visited in random order.
pub fn pick_children<R: Rng + ?Sized>(
    rng: &mut R,
    variants: &[SimpleVariant],
    selectors: &[u64],
    wanted: usize,
) -> Vec<u64> {
    let mut order: Vec<usize> = (0..variants.len()).collect();
    order.shuffle(rng);

    let mut seen_products = HashSet::new();
    let mut seen_keys = HashSet::new();
    let mut children = Vec::new();
    for slot in order {
        if children.len() >= wanted {
            break;
        }
        let variant = &variants[slot];
        let key: Vec<Option<u64>> = selectors
            .iter()
            .map(|id| variant.signature.get(id).copied().flatten())
            .collect();
        if !seen_products.insert(variant.product_id) || !seen_keys.insert(key) {
            continue;
        }
        children.push(variant.product_id);
    }
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::products::Signature;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn variant(product_id: u64, options: &[(u64, u64)]) -> SimpleVariant {
        let signature: Signature = options.iter().map(|(a, o)| (*a, Some(*o))).collect();
        SimpleVariant {
            product_id,
            signature,
        }
    }

    #[test]
    fn children_never_share_an_option_tuple() {
        let variants = vec![
            variant(1, &[(10, 100), (11, 200)]),
            variant(2, &[(10, 100), (11, 200)]),
            variant(3, &[(10, 101), (11, 200)]),
            variant(4, &[(10, 100), (11, 201)]),
            variant(5, &[(10, 101), (11, 200)]),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let children = pick_children(&mut rng, &variants, &[10, 11], 10);
        assert_eq!(children.len(), 3);

        let keys: HashSet<(u64, u64)> = children
            .iter()
            .map(|id| {
                let v = variants.iter().find(|v| v.product_id == *id).expect("variant");
                (v.signature[&10].unwrap_or(0), v.signature[&11].unwrap_or(0))
            })
            .collect();
        assert_eq!(keys.len(), children.len());
    }

    #[test]
    fn without_selectors_only_one_child_fits() {
        let variants = vec![variant(1, &[(10, 100)]), variant(2, &[(10, 101)])];
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        assert_eq!(pick_children(&mut rng, &variants, &[], 5).len(), 1);
        assert!(pick_children(&mut rng, &variants, &[10], 0).is_empty());
    }
}
