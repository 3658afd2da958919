use catalogen_config::ProductCommon;
use rand::Rng;

use crate::output::{Row, SqlValue, TableId};
use crate::state::GeneratorState;

const DEFAULT_STOCK_ID: i64 = 1;

/// Emits the `cataloginventory_stock_item` row of a product.
///
/// Quantity is drawn from `inventory` (0 when unset); the item is out of
/// stock with `out_of_stock` percent chance.
pub(crate) fn push_stock_item(state: &mut GeneratorState<'_>, product_id: u64, common: &ProductCommon) {
    let qty = match common.inventory {
        Some(bounds) => state.rng.random_range(bounds.min..=bounds.max),
        None => 0,
    };
    let in_stock = state.rng.random_range(1..=100) > common.out_of_stock;

    state.output.push(
        TableId::StockItem,
        Row::new()
            .with("item_id", SqlValue::Null)
            .with("product_id", product_id)
            .with("stock_id", DEFAULT_STOCK_ID)
            .with("qty", f64::from(qty))
            .with("min_qty", 0.0)
            .with("use_config_min_qty", 1_i64)
            .with("is_qty_decimal", 0_i64)
            .with("backorders", 0_i64)
            .with("use_config_backorders", 1_i64)
            .with("min_sale_qty", 1.0)
            .with("use_config_min_sale_qty", 1_i64)
            .with("max_sale_qty", 0.0)
            .with("use_config_max_sale_qty", 1_i64)
            .with("is_in_stock", in_stock)
            .with("low_stock_date", SqlValue::Null)
            .with("notify_stock_qty", SqlValue::Null)
            .with("use_config_notify_stock_qty", 1_i64)
            .with("manage_stock", 1_i64)
            .with("use_config_manage_stock", 1_i64)
            .with("stock_status_changed_auto", 0_i64)
            .with("use_config_qty_increments", 1_i64)
            .with("qty_increments", 0.0)
            .with("use_config_enable_qty_inc", 1_i64)
            .with("enable_qty_increments", 0_i64)
            .with("is_decimal_divided", 0_i64)
            .with("website_id", state.metadata.website_id()),
    );
}
