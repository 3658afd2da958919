use catalogen_config::PriceConfig;
use chrono::NaiveDate;
use rand::Rng;

use crate::errors::GenerationError;
use crate::output::{Row, SqlValue, TableId};
use crate::phases::products::push_attribute_value;
use crate::state::GeneratorState;

/// Quantity breaks of the tier price table.
const TIER_QUANTITIES: [u32; 3] = [2, 5, 10];

/// `NOT LOGGED IN` group; tier rows for it are written as all-groups rows.
const ALL_GROUPS: u64 = 0;

/// Writes the price attribute and the optional special, group and tier
/// prices derived from it. Returns the base price.
pub(crate) fn push_prices(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    config: &PriceConfig,
    customer_groups: &[u64],
) -> Result<f64, GenerationError> {
    let price = push_base_price(state, product_id, config)?;

    if config.special > 0 && state.rng.random_range(1..=100) < config.special {
        push_special_price(state, product_id, price)?;
    }
    if state.rng.random_range(1..=100) <= config.group {
        push_group_prices(state, product_id, price, config.group, customer_groups);
    }
    if state.rng.random_range(1..=100) <= config.tier {
        push_tier_prices(state, product_id, price, config.tier, customer_groups);
    }
    Ok(price)
}

/// Writes only the `price` attribute, drawn in whole cents.
pub(crate) fn push_base_price(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    config: &PriceConfig,
) -> Result<f64, GenerationError> {
    let cents = state
        .rng
        .random_range(to_cents(config.min)..=to_cents(config.max));
    let price = cents as f64 / 100.0;
    push_attribute_value(state, product_id, "price", price.into())?;
    Ok(price)
}

fn to_cents(amount: f64) -> u64 {
    (amount * 100.0).round().max(0.0) as u64
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn ratio<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.random_range(60..=95_u32)) / 100.0
}

fn push_special_price(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    price: f64,
) -> Result<(), GenerationError> {
    let special = round_cents(price * ratio(&mut state.rng));
    push_attribute_value(state, product_id, "special_price", special.into())?;

    let from = (state.rng.random_range(1..=3) == 1)
        .then(|| random_date(&mut state.rng, 2015..=2015))
        .flatten();
    let to = (state.rng.random_range(1..=3) == 1)
        .then(|| random_date(&mut state.rng, 2015..=2017))
        .flatten();
    push_attribute_value(state, product_id, "special_from_date", from.into())?;
    push_attribute_value(state, product_id, "special_to_date", to.into())?;
    Ok(())
}

fn random_date<R: Rng + ?Sized>(
    rng: &mut R,
    years: std::ops::RangeInclusive<i32>,
) -> Option<String> {
    let year = rng.random_range(years);
    let month = rng.random_range(1..=12);
    let day = rng.random_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.format("%Y-%m-%d 00:00:00").to_string())
}

/// Group prices are written as quantity-one tier rows.
fn push_group_prices(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    price: f64,
    chance: u32,
    customer_groups: &[u64],
) {
    for &group in customer_groups {
        if state.rng.random_range(1..=100) > chance {
            continue;
        }
        let value = round_cents(price * ratio(&mut state.rng));
        state.output.push(
            TableId::TierPrice,
            tier_row(product_id, group, 1, value),
        );
    }
}

fn push_tier_prices(
    state: &mut GeneratorState<'_>,
    product_id: u64,
    price: f64,
    chance: u32,
    customer_groups: &[u64],
) {
    let groups = std::iter::once(ALL_GROUPS).chain(customer_groups.iter().copied());
    let groups: Vec<u64> = groups.collect();

    for qty in TIER_QUANTITIES {
        for &group in &groups {
            if group == ALL_GROUPS && chance == 100 {
                continue;
            }
            if state.rng.random_range(1..=100) > chance {
                continue;
            }
            let discount = state.rng.random_range(qty..=qty + 3);
            let value = round_cents(price * f64::from(100 - discount) / 100.0);
            state.output.push(
                TableId::TierPrice,
                tier_row(product_id, group, qty, value),
            );

            if group == 1 {
                state.output.push(
                    TableId::TierPrice,
                    tier_row(product_id, ALL_GROUPS, qty, value),
                );
            }
            if group == ALL_GROUPS {
                break;
            }
        }
    }
}

fn tier_row(product_id: u64, group: u64, qty: u32, value: f64) -> Row {
    Row::new()
        .with("value_id", SqlValue::Null)
        .with("row_id", product_id)
        .with("all_groups", 0_i64)
        .with("customer_group_id", group)
        .with("qty", f64::from(qty))
        .with("value", value)
        .with("website_id", 0_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_dates_stay_within_the_year_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let date = random_date(&mut rng, 2015..=2017).expect("valid date");
            let year: i32 = date[..4].parse().expect("year");
            assert!((2015..=2017).contains(&year));
            assert!(date.ends_with(" 00:00:00"));
        }
    }

    #[test]
    fn amounts_convert_to_cents_and_clamp_negative() {
        assert_eq!(to_cents(10.5), 1050);
        assert_eq!(to_cents(-3.0), 0);
        assert_eq!(to_cents(99.99), 9999);
    }

    #[test]
    fn derived_prices_round_to_whole_cents() {
        assert_eq!(round_cents(10.99 * 0.61), 6.7);
        assert_eq!(round_cents(8.2678), 8.27);
        assert_eq!(round_cents(12.0), 12.0);
    }
}
