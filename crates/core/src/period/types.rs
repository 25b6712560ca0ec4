//! Accounting period types.

use arus_shared::types::PeriodId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a period accepts postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Postings allowed.
    Open,
    /// No posting allowed.
    Closed,
}

impl PeriodStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// An accounting period covering `[start_date, end_date]` inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Period ID.
    pub id: PeriodId,
    /// Display name, e.g. "June 2025".
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Posting status.
    pub status: PeriodStatus,
}

impl AccountingPeriod {
    /// Returns true if `date` falls within the period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if postings are allowed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }
}
