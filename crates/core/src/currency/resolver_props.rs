//! Property-based tests for rate resolution.
//!
//! - Property 1: Direct lines take priority over quotes
//! - Property 2: Overlapping sets resolve to the highest ID
//! - Property 3: Identity conversion
//! - Property 4: Requests outside every range fail

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::RateError;
use super::resolver::RateResolver;
use super::types::{
    CurrencyInfo, CurrencyQuote, RateLineCandidate, RateQuery, RateSource, RateStatus, RateWhen,
};
use arus_shared::types::{CurrencyId, ExchangeRateId, RateTypeId};

fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn day_in_2025() -> impl Strategy<Value = NaiveDate> {
    (1u32..=365).prop_map(|ordinal| NaiveDate::from_yo_opt(2025, ordinal).unwrap())
}

fn currency(id: i64, code: &str, is_base: bool) -> CurrencyInfo {
    CurrencyInfo {
        id: CurrencyId::new(id),
        code: code.to_string(),
        decimal_places: 2,
        is_base,
    }
}

fn query(day: NaiveDate) -> RateQuery {
    RateQuery {
        from: currency(1, "IDR", true),
        to: currency(2, "USD", false),
        base: currency(1, "IDR", true),
        when: RateWhen::Date(day),
        rate_type: None,
    }
}

fn covering_line(id: i64, day: NaiveDate, rate: Decimal) -> RateLineCandidate {
    RateLineCandidate {
        exchange_rate_id: ExchangeRateId::new(id),
        rate_type_id: RateTypeId::new(1),
        from_date: day,
        to_date: day,
        status: RateStatus::Active,
        from_currency_id: CurrencyId::new(1),
        to_currency_id: CurrencyId::new(2),
        rate,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Direct line priority
    // =========================================================================

    /// *For any* request where both a direct line and quotes exist, the
    /// direct line SHALL be used and the result SHALL equal amount * rate.
    #[test]
    fn prop_direct_line_beats_quotes(
        day in day_in_2025(),
        rate in positive_rate(),
        middle in positive_rate(),
        amount in positive_amount(),
    ) {
        let lines = vec![covering_line(1, day, rate)];
        let quotes = vec![CurrencyQuote {
            id: 1,
            currency_id: CurrencyId::new(2),
            rate_type_id: RateTypeId::new(1),
            rate_date: day,
            buy_rate: middle,
            sell_rate: middle,
            middle_rate: middle,
        }];

        let conversion = RateResolver::convert(&query(day), amount, &lines, &quotes).unwrap();

        prop_assert_eq!(
            conversion.rate.source,
            RateSource::ExchangeRate { exchange_rate_id: ExchangeRateId::new(1) }
        );
        prop_assert_eq!(conversion.result, (amount * rate).round_dp_with_strategy(
            2,
            rust_decimal::RoundingStrategy::MidpointNearestEven,
        ));
    }

    // =========================================================================
    // Property 2: Highest ID wins
    // =========================================================================

    /// *For any* set of overlapping lines covering the day, the line with the
    /// highest exchange rate ID SHALL be selected.
    #[test]
    fn prop_highest_id_wins(
        day in day_in_2025(),
        rates in prop::collection::vec(positive_rate(), 1..8),
    ) {
        let lines: Vec<RateLineCandidate> = rates
            .iter()
            .enumerate()
            .map(|(i, r)| covering_line(i as i64 + 1, day, *r))
            .collect();

        let resolved = RateResolver::resolve(&query(day), &lines, &[]).unwrap();

        prop_assert_eq!(resolved.from_rate, *rates.last().unwrap());
    }

    // =========================================================================
    // Property 3: Identity
    // =========================================================================

    /// *For any* amount, converting a currency into itself SHALL return the
    /// amount rounded to the currency's decimals.
    #[test]
    fn prop_identity_conversion(day in day_in_2025(), amount in positive_amount()) {
        let mut q = query(day);
        q.to = q.from.clone();

        let conversion = RateResolver::convert(&q, amount, &[], &[]).unwrap();

        prop_assert_eq!(conversion.result, amount);
        prop_assert_eq!(conversion.rate.source, RateSource::Identity);
    }

    // =========================================================================
    // Property 4: Uncovered requests fail
    // =========================================================================

    /// *For any* request day that no line or quote covers, resolution SHALL
    /// fail with `RateNotFound`.
    #[test]
    fn prop_uncovered_day_not_found(
        line_day in day_in_2025(),
        request_day in day_in_2025(),
        rate in positive_rate(),
    ) {
        prop_assume!(line_day != request_day);
        let lines = vec![covering_line(1, line_day, rate)];

        let result = RateResolver::resolve(&query(request_day), &lines, &[]);

        let is_not_found = matches!(result, Err(RateError::RateNotFound { .. }));
        prop_assert!(is_not_found);
    }
}
