//! Accounting period errors.

use arus_shared::AppError;
use arus_shared::types::PeriodId;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the period gate and period maintenance.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// No period covers the date.
    #[error("No accounting period covers {0}")]
    NoPeriod(NaiveDate),

    /// The covering period is closed.
    #[error("Accounting period '{name}' is closed for {date}")]
    Closed {
        /// Period name.
        name: String,
        /// Requested date.
        date: NaiveDate,
    },

    /// More than one period covers the date.
    #[error("Date {0} falls into more than one accounting period")]
    Overlapping(NaiveDate),

    /// A new period would overlap an existing one.
    #[error("Period {start_date}..{end_date} overlaps existing period '{existing}'")]
    OverlapsExisting {
        /// New period start.
        start_date: NaiveDate,
        /// New period end.
        end_date: NaiveDate,
        /// Name of the existing period.
        existing: String,
    },

    /// Start after end.
    #[error("Start date {start_date} is after end date {end_date}")]
    InvalidDateRange {
        /// Start.
        start_date: NaiveDate,
        /// End.
        end_date: NaiveDate,
    },

    /// Empty name.
    #[error("Period name is required")]
    MissingName,

    /// Unknown period.
    #[error("Accounting period {0} not found")]
    NotFound(PeriodId),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl PeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoPeriod(_) => "NO_ACCOUNTING_PERIOD",
            Self::Closed { .. } => "PERIOD_CLOSED",
            Self::Overlapping(_) => "OVERLAPPING_PERIODS",
            Self::OverlapsExisting { .. } => "PERIOD_OVERLAP",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::MissingName => "MISSING_NAME",
            Self::NotFound(_) => "PERIOD_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NoPeriod(_) | Self::Closed { .. } | Self::Overlapping(_) => 422,
            Self::OverlapsExisting { .. } => 409,
            Self::InvalidDateRange { .. } | Self::MissingName => 400,
            Self::NotFound(_) => 404,
            Self::Database(_) => 503,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Returns true if the error means posting is not allowed on the date.
    #[must_use]
    pub fn blocks_posting(&self) -> bool {
        matches!(
            self,
            Self::NoPeriod(_) | Self::Closed { .. } | Self::Overlapping(_)
        )
    }
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        let message = err.to_string();
        match err {
            PeriodError::NoPeriod(_) | PeriodError::Closed { .. } | PeriodError::Overlapping(_) => {
                Self::PeriodClosed(message)
            }
            PeriodError::OverlapsExisting { .. } => Self::Conflict(message),
            PeriodError::InvalidDateRange { .. } | PeriodError::MissingName => {
                Self::Validation(message)
            }
            PeriodError::NotFound(_) => Self::NotFound(message),
            PeriodError::Database(_) => Self::Storage(message),
        }
    }
}
