//! Property-based tests for the period gate.
//!
//! - Property 1: Posting allowed iff exactly one open period contains the date
//! - Property 2: Accepted new periods never overlap existing ones

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::gate::{PeriodGate, date_ranges_overlap};
use super::types::{AccountingPeriod, PeriodStatus};
use arus_shared::types::PeriodId;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Contiguous, non-overlapping periods with random lengths and statuses.
fn contiguous_periods() -> impl Strategy<Value = Vec<AccountingPeriod>> {
    prop::collection::vec((1u64..40, any::<bool>()), 1..12).prop_map(|specs| {
        let mut start = epoch();
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (len, open))| {
                let end = start + Days::new(len - 1);
                let period = AccountingPeriod {
                    id: PeriodId::new(i as i64 + 1),
                    name: format!("P{}", i + 1),
                    start_date: start,
                    end_date: end,
                    status: if open { PeriodStatus::Open } else { PeriodStatus::Closed },
                };
                start = end + Days::new(1);
                period
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Posting gate
    // =========================================================================

    /// *For any* date, posting SHALL be allowed iff the period containing it
    /// is open.
    #[test]
    fn prop_posting_allowed_iff_open(
        periods in contiguous_periods(),
        offset in 0u64..500,
    ) {
        let day = epoch() + Days::new(offset);
        let containing = periods.iter().find(|p| p.contains_date(day));
        let result = PeriodGate::check_posting(&periods, day);

        match containing {
            Some(p) if p.is_open() => prop_assert_eq!(result.unwrap().id, p.id),
            _ => prop_assert!(result.is_err()),
        }
    }

    // =========================================================================
    // Property 2: Non-overlap
    // =========================================================================

    /// *For any* candidate range accepted by validation, it SHALL share no
    /// day with an existing period.
    #[test]
    fn prop_accepted_period_does_not_overlap(
        periods in contiguous_periods(),
        start_offset in 0u64..600,
        len in 1u64..60,
    ) {
        let start = epoch() + Days::new(start_offset);
        let end = start + Days::new(len - 1);

        if PeriodGate::validate_new_period("New", start, end, &periods).is_ok() {
            for p in &periods {
                prop_assert!(!date_ranges_overlap(start, end, p.start_date, p.end_date));
            }
        }
    }
}
