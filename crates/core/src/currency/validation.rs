//! Validation for rate maintenance (exchange rate sets and daily quotes).

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::RateError;
use arus_shared::types::CurrencyId;

/// Middle rate used when none is supplied: the average of buy and sell.
#[must_use]
pub fn middle_rate(buy_rate: Decimal, sell_rate: Decimal) -> Decimal {
    (buy_rate + sell_rate) / Decimal::TWO
}

/// Validates an exchange rate set before it is stored.
///
/// # Errors
///
/// Returns `InvalidDateRange`, `InvalidRate` or `SameCurrency`.
pub fn validate_rate_set(
    from_date: NaiveDate,
    to_date: NaiveDate,
    lines: &[(CurrencyId, CurrencyId, Decimal)],
) -> Result<(), RateError> {
    if from_date > to_date {
        return Err(RateError::InvalidDateRange { from_date, to_date });
    }
    if lines.is_empty() {
        return Err(RateError::InvalidRate(
            "an exchange rate set needs at least one line".to_string(),
        ));
    }
    for (from, to, rate) in lines {
        if from == to {
            return Err(RateError::SameCurrency);
        }
        if *rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate(rate.to_string()));
        }
    }
    Ok(())
}

/// Validates a daily quote and returns the middle rate to store.
///
/// # Errors
///
/// Returns `InvalidRate` if any rate is not positive.
pub fn resolve_quote_middle(
    buy_rate: Decimal,
    sell_rate: Decimal,
    middle_override: Option<Decimal>,
) -> Result<Decimal, RateError> {
    for rate in [buy_rate, sell_rate] {
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate(rate.to_string()));
        }
    }
    match middle_override {
        Some(middle) if middle <= Decimal::ZERO => Err(RateError::InvalidRate(middle.to_string())),
        Some(middle) => Ok(middle),
        None => Ok(middle_rate(buy_rate, sell_rate)),
    }
}
