//! `nilecart-pricing` — pure pricing engine.
//!
//! Shipping cost by governorate and effective unit price resolution. No IO,
//! no side effects; the storefront client runs the same zone table for display
//! and the server value here is the authoritative one.

pub mod shipping;

use rust_decimal::{Decimal, RoundingStrategy};

use nilecart_catalog::Product;

pub use shipping::compute_shipping_price;

/// The unit price an order line should be billed at right now.
///
/// Returns the sale price only while the sale window is open
/// (`is_sale_active && sale_sold < sale_limit`, strict `<`). An exhausted sale
/// falls back to the base price even though the stored flag remains set.
pub fn resolve_effective_unit_price(product: &Product) -> Decimal {
    if product.sale_available() {
        product.sale_price
    } else {
        product.price
    }
}

/// Round a money amount to 2 decimal places, midpoint away from zero.
///
/// The result always carries exactly two decimal places, so totals render as
/// `570.00` rather than `570`.
pub fn round2(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
