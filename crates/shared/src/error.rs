//! Application-wide error types.
//!
//! Every domain error (sequence, rate, ledger, period) collapses into one of
//! these kinds before it reaches a client.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (transcode, journal, account, invoice, currency).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input detected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Journal debits and credits differ by more than the tolerance.
    #[error("Unbalanced: {0}")]
    Unbalanced(String),

    /// Operation not allowed in the entity's current status.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Posting date falls outside any open accounting period.
    #[error("Period closed: {0}")]
    PeriodClosed(String),

    /// No applicable exchange rate for the request.
    #[error("Rate not found: {0}")]
    RateNotFound(String),

    /// Concurrent modification or duplicate key; the caller may retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure while committing.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::RateNotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Unbalanced(_) | Self::PeriodClosed(_) => 422,
            Self::InvalidState(_) | Self::Conflict(_) => 409,
            Self::Storage(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unbalanced(_) => "UNBALANCED",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::RateNotFound(_) => "RATE_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Storage(_))
    }

    /// Returns the message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::Validation(m)
            | Self::Unbalanced(m)
            | Self::InvalidState(m)
            | Self::PeriodClosed(m)
            | Self::RateNotFound(m)
            | Self::Conflict(m)
            | Self::Storage(m)
            | Self::Internal(m) => m,
        }
    }
}
