//! Multi-currency rate resolution and conversion.
//!
//! Rates come from two sources: exchange rate sets (date ranges of
//! pair-specific lines) and daily per-currency quotes against the base
//! currency. The resolver prefers a direct line and falls back to quotes.

pub mod conversion;
pub mod error;
pub mod resolver;
pub mod types;
pub mod validation;

#[cfg(test)]
mod resolver_props;

pub use conversion::{convert_amount, convert_cross, round_amount};
pub use error::RateError;
pub use resolver::RateResolver;
pub use types::{
    Conversion, CurrencyInfo, CurrencyQuote, MonthRef, RateLineCandidate, RateQuery, RateSource,
    RateStatus, RateWhen, ResolvedRate,
};
pub use validation::{middle_rate, resolve_quote_middle, validate_rate_set};
