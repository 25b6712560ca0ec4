//! Rate resolution errors.

use arus_shared::AppError;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during rate resolution and rate maintenance.
#[derive(Debug, Error)]
pub enum RateError {
    /// Unknown currency code.
    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    /// No currency is flagged as the base currency.
    #[error("No base currency configured")]
    BaseCurrencyMissing,

    /// Neither an exchange rate line nor currency quotes cover the request.
    #[error("No exchange rate found for {from} to {to} at {when}")]
    RateNotFound {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// Requested date or month.
        when: String,
    },

    /// Invalid year/month pair.
    #[error("Invalid month {year}-{month}")]
    InvalidMonth {
        /// Year.
        year: i32,
        /// Month number.
        month: u32,
    },

    /// Rates must be positive.
    #[error("Exchange rate must be positive: {0}")]
    InvalidRate(String),

    /// A rate line converts a currency into itself.
    #[error("From and to currencies must be different")]
    SameCurrency,

    /// `from_date` after `to_date`.
    #[error("Invalid validity range: {from_date} is after {to_date}")]
    InvalidDateRange {
        /// Range start.
        from_date: NaiveDate,
        /// Range end.
        to_date: NaiveDate,
    },

    /// A quote already exists for the currency, rate type and date.
    #[error("A {code} rate already exists for {date}")]
    DuplicateQuote {
        /// Currency code.
        code: String,
        /// Quote date.
        date: NaiveDate,
    },

    /// Arithmetic overflow while converting.
    #[error("Conversion overflow for amount {0}")]
    Overflow(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl RateError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CurrencyNotFound(_) => "CURRENCY_NOT_FOUND",
            Self::BaseCurrencyMissing => "BASE_CURRENCY_MISSING",
            Self::RateNotFound { .. } => "RATE_NOT_FOUND",
            Self::InvalidMonth { .. } => "INVALID_MONTH",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::SameCurrency => "SAME_CURRENCY",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::DuplicateQuote { .. } => "DUPLICATE_RATE",
            Self::Overflow(_) => "CONVERSION_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::CurrencyNotFound(_) | Self::BaseCurrencyMissing | Self::RateNotFound { .. } => {
                404
            }
            Self::InvalidMonth { .. }
            | Self::InvalidRate(_)
            | Self::SameCurrency
            | Self::InvalidDateRange { .. }
            | Self::Overflow(_) => 400,
            Self::DuplicateQuote { .. } => 409,
            Self::Database(_) => 503,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        let message = err.to_string();
        match err {
            RateError::CurrencyNotFound(_) | RateError::BaseCurrencyMissing => {
                Self::NotFound(message)
            }
            RateError::RateNotFound { .. } => Self::RateNotFound(message),
            RateError::InvalidMonth { .. }
            | RateError::InvalidRate(_)
            | RateError::SameCurrency
            | RateError::InvalidDateRange { .. }
            | RateError::Overflow(_) => Self::Validation(message),
            RateError::DuplicateQuote { .. } => Self::Conflict(message),
            RateError::Database(_) => Self::Storage(message),
        }
    }
}
