//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's decimal places
//! - Use banker's rounding (round half to even)
//! - Round once, after the full rate has been applied

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Rounds a value to `decimal_places` using banker's rounding.
#[must_use]
pub fn round_amount(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Converts an amount using a direct exchange rate.
///
/// Returns `None` on overflow.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|converted| round_amount(converted, decimal_places))
}

/// Converts an amount through two rates quoted against a common base:
/// `amount * from_rate / to_rate`.
///
/// Returns `None` on overflow or a zero `to_rate`.
#[must_use]
pub fn convert_cross(
    amount: Decimal,
    from_rate: Decimal,
    to_rate: Decimal,
    decimal_places: u32,
) -> Option<Decimal> {
    amount
        .checked_mul(from_rate)?
        .checked_div(to_rate)
        .map(|converted| round_amount(converted, decimal_places))
}
