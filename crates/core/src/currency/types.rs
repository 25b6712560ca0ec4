//! Currency and exchange rate domain types.

use std::fmt;

use arus_shared::types::{CurrencyId, ExchangeRateId, RateTypeId};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency master data needed for conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Currency ID.
    pub id: CurrencyId,
    /// ISO-style code, e.g. "IDR".
    pub code: String,
    /// Minor units used when rounding converted amounts.
    pub decimal_places: u32,
    /// Whether this is the book (base) currency.
    pub is_base: bool,
}

/// Lifecycle status of an exchange rate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateStatus {
    /// `A` - active.
    #[serde(rename = "A")]
    Active,
    /// `C` - closed; still valid for dates inside its range.
    #[serde(rename = "C")]
    Closed,
    /// `I` - inactive; ignored by resolution.
    #[serde(rename = "I")]
    Inactive,
}

impl RateStatus {
    /// Returns the single-letter status code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Active => "A",
            Self::Closed => "C",
            Self::Inactive => "I",
        }
    }

    /// Parses a single-letter status code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Active),
            "C" => Some(Self::Closed),
            "I" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Returns true if lines of a set with this status can be used.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// A calendar month, stored as its first and last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    first: NaiveDate,
    last: NaiveDate,
}

impl MonthRef {
    /// Creates a month reference, or `None` for an invalid year/month.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { first, last })
    }

    /// First day of the month.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Last day of the month.
    #[must_use]
    pub const fn last_day(&self) -> NaiveDate {
        self.last
    }
}

/// Point in time a rate is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWhen {
    /// A specific day.
    Date(NaiveDate),
    /// The latest rate effective within a month.
    Month(MonthRef),
}

impl RateWhen {
    /// Inclusive date bounds a candidate must intersect.
    #[must_use]
    pub const fn bounds(&self) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Date(d) => (*d, *d),
            Self::Month(m) => (m.first, m.last),
        }
    }

    /// Date reported when no stored rate is involved.
    #[must_use]
    pub const fn anchor(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::Month(m) => m.last,
        }
    }
}

impl fmt::Display for RateWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::Month(m) => write!(f, "{:04}-{:02}", m.first.year(), m.first.month()),
        }
    }
}

/// One directional line of an exchange rate set, flattened with its header.
#[derive(Debug, Clone)]
pub struct RateLineCandidate {
    /// Owning exchange rate set.
    pub exchange_rate_id: ExchangeRateId,
    /// Rate type of the set.
    pub rate_type_id: RateTypeId,
    /// First day the set is valid.
    pub from_date: NaiveDate,
    /// Last day the set is valid.
    pub to_date: NaiveDate,
    /// Set status.
    pub status: RateStatus,
    /// Source currency.
    pub from_currency_id: CurrencyId,
    /// Target currency.
    pub to_currency_id: CurrencyId,
    /// `1 from = rate to`.
    pub rate: Decimal,
}

/// Daily buy/sell/middle quote of a currency against the base currency.
#[derive(Debug, Clone)]
pub struct CurrencyQuote {
    /// Row ID, used to break ties between equal dates.
    pub id: i64,
    /// Quoted currency.
    pub currency_id: CurrencyId,
    /// Rate type.
    pub rate_type_id: RateTypeId,
    /// Quote date.
    pub rate_date: NaiveDate,
    /// Buy rate.
    pub buy_rate: Decimal,
    /// Sell rate.
    pub sell_rate: Decimal,
    /// Middle rate, `1 currency = middle_rate base`.
    pub middle_rate: Decimal,
}

/// A conversion request.
#[derive(Debug, Clone)]
pub struct RateQuery {
    /// Source currency.
    pub from: CurrencyInfo,
    /// Target currency.
    pub to: CurrencyInfo,
    /// Book currency used for quote fallback.
    pub base: CurrencyInfo,
    /// Date or month of the request.
    pub when: RateWhen,
    /// Restrict to one rate type; any type when `None`.
    pub rate_type: Option<RateTypeId>,
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateSource {
    /// Same currency; no stored rate involved.
    Identity,
    /// Directional exchange rate line.
    ExchangeRate {
        /// Exchange rate set that supplied the line.
        exchange_rate_id: ExchangeRateId,
    },
    /// Middle rates of both currencies against the base currency.
    CurrencyRate,
}

/// Rate selected for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRate {
    /// Units of base (or target) per unit of source.
    pub from_rate: Decimal,
    /// Units of base per unit of target; 1 for direct lines.
    pub to_rate: Decimal,
    /// Effective date of the rate used.
    pub effective_date: NaiveDate,
    /// Rate type of the rate used, if any.
    pub rate_type_id: Option<RateTypeId>,
    /// Provenance.
    pub source: RateSource,
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Input amount.
    pub amount: Decimal,
    /// Converted amount, rounded to the target currency.
    pub result: Decimal,
    /// Rate details.
    #[serde(flatten)]
    pub rate: ResolvedRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let feb = MonthRef::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = MonthRef::new(2025, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        assert!(MonthRef::new(2025, 13).is_none());
        assert!(MonthRef::new(2025, 0).is_none());
    }

    #[test]
    fn test_when_display_and_anchor() {
        let june = RateWhen::Month(MonthRef::new(2025, 6).unwrap());
        assert_eq!(june.to_string(), "2025-06");
        assert_eq!(june.anchor(), NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());

        let day = RateWhen::Date(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(day.to_string(), "2025-06-15");
        assert_eq!(day.bounds().0, day.bounds().1);
    }

    #[test]
    fn test_rate_status_codes() {
        for status in [RateStatus::Active, RateStatus::Closed, RateStatus::Inactive] {
            assert_eq!(RateStatus::from_code(status.code()), Some(status));
        }
        assert!(RateStatus::Closed.is_usable());
        assert!(!RateStatus::Inactive.is_usable());
        assert_eq!(RateStatus::from_code("X"), None);
    }
}
