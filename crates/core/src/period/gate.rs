//! Posting gate over accounting periods.

use chrono::NaiveDate;

use super::error::PeriodError;
use super::types::AccountingPeriod;

/// Returns true if two inclusive date ranges share at least one day.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Stateless period gate. Callers load the candidate periods.
pub struct PeriodGate;

impl PeriodGate {
    /// Finds the single period containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `Overlapping` if more than one period contains the date.
    pub fn resolve(
        periods: &[AccountingPeriod],
        date: NaiveDate,
    ) -> Result<Option<&AccountingPeriod>, PeriodError> {
        let mut matching = periods.iter().filter(|p| p.contains_date(date));
        let first = matching.next();
        if matching.next().is_some() {
            return Err(PeriodError::Overlapping(date));
        }
        Ok(first)
    }

    /// Checks that `date` falls within exactly one open period.
    ///
    /// # Errors
    ///
    /// Returns `NoPeriod`, `Overlapping` or `Closed`.
    pub fn check_posting(
        periods: &[AccountingPeriod],
        date: NaiveDate,
    ) -> Result<&AccountingPeriod, PeriodError> {
        let period = Self::resolve(periods, date)?.ok_or(PeriodError::NoPeriod(date))?;
        if !period.is_open() {
            return Err(PeriodError::Closed {
                name: period.name.clone(),
                date,
            });
        }
        Ok(period)
    }

    /// Validates a new period against the existing ones.
    ///
    /// # Errors
    ///
    /// Returns `MissingName`, `InvalidDateRange` or `OverlapsExisting`.
    pub fn validate_new_period(
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        existing: &[AccountingPeriod],
    ) -> Result<(), PeriodError> {
        if name.trim().is_empty() {
            return Err(PeriodError::MissingName);
        }
        if start_date > end_date {
            return Err(PeriodError::InvalidDateRange {
                start_date,
                end_date,
            });
        }
        if let Some(clash) = existing
            .iter()
            .find(|p| date_ranges_overlap(start_date, end_date, p.start_date, p.end_date))
        {
            return Err(PeriodError::OverlapsExisting {
                start_date,
                end_date,
                existing: clash.name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::types::PeriodStatus;
    use arus_shared::types::PeriodId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(id: i64, start: NaiveDate, end: NaiveDate, status: PeriodStatus) -> AccountingPeriod {
        AccountingPeriod {
            id: PeriodId::new(id),
            name: format!("P{id}"),
            start_date: start,
            end_date: end,
            status,
        }
    }

    fn year_2025() -> Vec<AccountingPeriod> {
        vec![
            period(5, date(2025, 5, 1), date(2025, 5, 31), PeriodStatus::Closed),
            period(6, date(2025, 6, 1), date(2025, 6, 30), PeriodStatus::Open),
        ]
    }

    #[test]
    fn test_open_period_allows_posting() {
        let periods = year_2025();
        let found = PeriodGate::check_posting(&periods, date(2025, 6, 15)).unwrap();
        assert_eq!(found.id, PeriodId::new(6));

        // Boundaries are inclusive
        assert!(PeriodGate::check_posting(&periods, date(2025, 6, 1)).is_ok());
        assert!(PeriodGate::check_posting(&periods, date(2025, 6, 30)).is_ok());
    }

    #[test]
    fn test_closed_period_rejected() {
        let periods = year_2025();
        let result = PeriodGate::check_posting(&periods, date(2025, 5, 20));
        assert!(matches!(result, Err(PeriodError::Closed { .. })));
    }

    #[test]
    fn test_date_outside_periods_rejected() {
        let periods = year_2025();
        let result = PeriodGate::check_posting(&periods, date(2025, 7, 1));
        assert!(matches!(result, Err(PeriodError::NoPeriod(_))));
        assert!(result.unwrap_err().blocks_posting());
    }

    #[test]
    fn test_overlapping_periods_rejected() {
        let mut periods = year_2025();
        periods.push(period(7, date(2025, 6, 15), date(2025, 7, 15), PeriodStatus::Open));

        let result = PeriodGate::check_posting(&periods, date(2025, 6, 20));
        assert!(matches!(result, Err(PeriodError::Overlapping(_))));
    }

    #[test]
    fn test_validate_new_period() {
        let periods = year_2025();

        assert!(
            PeriodGate::validate_new_period("July 2025", date(2025, 7, 1), date(2025, 7, 31), &periods)
                .is_ok()
        );
        assert!(matches!(
            PeriodGate::validate_new_period("Bad", date(2025, 7, 31), date(2025, 7, 1), &periods),
            Err(PeriodError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            PeriodGate::validate_new_period("Clash", date(2025, 6, 30), date(2025, 7, 30), &periods),
            Err(PeriodError::OverlapsExisting { .. })
        ));
        assert!(matches!(
            PeriodGate::validate_new_period("  ", date(2025, 7, 1), date(2025, 7, 31), &periods),
            Err(PeriodError::MissingName)
        ));
    }

    #[test]
    fn test_period_error_mapping() {
        use arus_shared::AppError;

        let app: AppError = PeriodError::NoPeriod(date(1990, 1, 1)).into();
        assert!(matches!(app, AppError::PeriodClosed(_)));
        assert_eq!(app.status_code(), 422);
    }
}
