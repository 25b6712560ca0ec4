//! Sequence allocator errors.

use arus_shared::AppError;
use thiserror::Error;

/// Errors that can occur while allocating or configuring document numbers.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// No transcode with the given code.
    #[error("Transcode '{0}' not found")]
    TranscodeNotFound(String),

    /// Transcode exists but is disabled.
    #[error("Transcode '{0}' is inactive")]
    TranscodeInactive(String),

    /// Transcode code already taken.
    #[error("Transcode '{0}' already exists")]
    DuplicateCode(String),

    /// Invalid transcode definition (empty code, negative counter, ...).
    #[error("Invalid transcode: {0}")]
    InvalidDefinition(String),

    /// Format template could not be parsed.
    #[error("Invalid format template: {0}")]
    InvalidTemplate(String),

    /// Counter cannot be incremented any further.
    #[error("Counter for transcode '{0}' is exhausted")]
    CounterOverflow(String),

    /// Row lock could not be acquired within the retry budget.
    #[error("Transcode '{code}' is busy after {attempts} attempts, please retry")]
    Contention {
        /// Transcode code.
        code: String,
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl SequenceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TranscodeNotFound(_) => "TRANSCODE_NOT_FOUND",
            Self::TranscodeInactive(_) => "TRANSCODE_INACTIVE",
            Self::DuplicateCode(_) => "DUPLICATE_TRANSCODE",
            Self::InvalidDefinition(_) => "INVALID_TRANSCODE",
            Self::InvalidTemplate(_) => "INVALID_TEMPLATE",
            Self::CounterOverflow(_) => "COUNTER_OVERFLOW",
            Self::Contention { .. } => "SEQUENCE_CONTENTION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // Inactive transcodes are reported as missing to the numbering endpoint
            Self::TranscodeNotFound(_) | Self::TranscodeInactive(_) => 404,
            Self::InvalidDefinition(_) | Self::InvalidTemplate(_) => 400,
            Self::DuplicateCode(_) | Self::Contention { .. } => 409,
            Self::CounterOverflow(_) => 422,
            Self::Database(_) => 503,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention { .. } | Self::Database(_))
    }
}

impl From<SequenceError> for AppError {
    fn from(err: SequenceError) -> Self {
        let message = err.to_string();
        match err {
            SequenceError::TranscodeNotFound(_) | SequenceError::TranscodeInactive(_) => {
                Self::NotFound(message)
            }
            SequenceError::InvalidDefinition(_) | SequenceError::InvalidTemplate(_) => {
                Self::Validation(message)
            }
            SequenceError::DuplicateCode(_) | SequenceError::Contention { .. } => {
                Self::Conflict(message)
            }
            SequenceError::CounterOverflow(_) => Self::InvalidState(message),
            SequenceError::Database(_) => Self::Storage(message),
        }
    }
}
