//! Business clock.
//!
//! Document numbers embed the allocation date, which is the business
//! calendar date in the configured timezone rather than the server's UTC date.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Source of "today" for the accounting engine.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    tz: Tz,
    fixed: Option<NaiveDate>,
}

impl BusinessClock {
    /// Creates a clock for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz, fixed: None }
    }

    /// Creates a clock from an IANA timezone name such as `Asia/Jakarta`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the name is not a known timezone.
    pub fn from_name(name: &str) -> Result<Self, AppError> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|e| AppError::Validation(format!("Unknown timezone '{name}': {e}")))
    }

    /// Creates a clock that always reports the same date.
    #[must_use]
    pub const fn fixed(date: NaiveDate) -> Self {
        Self {
            tz: Tz::UTC,
            fixed: Some(date),
        }
    }

    /// Returns the timezone of this clock.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Returns the current business date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz).date_naive())
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}
