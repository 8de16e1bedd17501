//! Shipping cost by destination governorate.

use rust_decimal::Decimal;

/// Cairo metro area.
const ZONE_A: &[&str] = &["Cairo", "Giza"];

/// Delta / canal / nearby coastal governorates. "Kafr El-Sheikh" appears in
/// both spellings because checkout forms have shipped both over time.
const ZONE_B: &[&str] = &[
    "Alexandria",
    "Beheira",
    "Kafr El Sheikh",
    "Kafr El-Sheikh",
    "Gharbia",
    "Monufia",
    "Suez",
    "Qalyubia",
    "Dakahlia",
    "Sharqia",
    "Damietta",
    "Port Said",
    "Ismailia",
    "Matruh",
];

const ZONE_A_PRICE: Decimal = Decimal::from_parts(70, 0, 0, false, 0);
const ZONE_B_PRICE: Decimal = Decimal::from_parts(90, 0, 0, false, 0);
const DEFAULT_PRICE: Decimal = Decimal::from_parts(120, 0, 0, false, 0);

/// Flat shipping price for a destination governorate.
///
/// Matching is whitespace- and case-insensitive. Anything unrecognized,
/// including an empty string, falls through to the default remote-zone price;
/// this never errors.
pub fn compute_shipping_price(state: &str) -> Decimal {
    let gov = state.trim();

    if ZONE_A.iter().any(|z| gov.eq_ignore_ascii_case(z)) {
        ZONE_A_PRICE
    } else if ZONE_B.iter().any(|z| gov.eq_ignore_ascii_case(z)) {
        ZONE_B_PRICE
    } else {
        DEFAULT_PRICE
    }
}
