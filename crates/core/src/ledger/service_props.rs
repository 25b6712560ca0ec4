//! Property-based tests for the ledger.
//!
//! - Property 1: Journal balance integrity
//! - Property 2: Foreign-currency lines convert with banker's rounding
//! - Property 3: Post then unpost restores invoice balances
//! - Property 4: Only drafts can be updated or deleted

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::lifecycle::{JournalAction, next_status};
use super::service::LedgerService;
use super::settlement::{InvoiceBalance, SettlementDirection, SettlementService};
use super::types::{BALANCE_TOLERANCE, JournalLineInput, JournalStatus, RefType};
use crate::currency::{CurrencyInfo, ResolvedRate, RateSource, round_amount};
use arus_shared::types::{AccountId, CurrencyId, InvoiceId, RateTypeId};

/// Strategy to generate positive decimal amounts (0.01 to 10,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 20,000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..200_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn status_strategy() -> impl Strategy<Value = JournalStatus> {
    prop_oneof![Just(JournalStatus::Draft), Just(JournalStatus::Posted)]
}

fn base() -> CurrencyInfo {
    CurrencyInfo {
        id: CurrencyId::new(1),
        code: "IDR".to_string(),
        decimal_places: 2,
        is_base: true,
    }
}

fn make_line(debit: Decimal, credit: Decimal) -> JournalLineInput {
    JournalLineInput {
        coa_id: AccountId::new(101),
        description: None,
        debit,
        credit,
        ref_id: None,
        ref_type: None,
        partner_id: None,
        currency_code: None,
        rate_type_id: None,
        exchange_rate: None,
    }
}

fn usd(code: &str) -> Result<CurrencyInfo, LedgerError> {
    Ok(CurrencyInfo {
        id: CurrencyId::new(2),
        code: code.to_string(),
        decimal_places: 2,
        is_base: false,
    })
}

fn unused_rates(_: &str, _: Option<RateTypeId>) -> Result<ResolvedRate, LedgerError> {
    Err(LedgerError::Validation("no rate expected".to_string()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Journal balance integrity
    // =========================================================================

    /// *For any* split of a total into debit lines against one credit line,
    /// the journal SHALL be accepted and balanced.
    #[test]
    fn prop_balanced_journal_accepted(
        amounts in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut lines: Vec<JournalLineInput> =
            amounts.iter().map(|a| make_line(*a, Decimal::ZERO)).collect();
        lines.push(make_line(Decimal::ZERO, total));

        let (_, totals) =
            LedgerService::validate_and_resolve(&lines, &base(), usd, unused_rates, |_| true)
                .unwrap();

        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.total_debit, totals.total_credit);
    }

    /// *For any* debit/credit pair, acceptance SHALL coincide with
    /// `|debit - credit| <= 0.01`.
    #[test]
    fn prop_tolerance_decides_acceptance(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        let lines = vec![make_line(debit, Decimal::ZERO), make_line(Decimal::ZERO, credit)];

        let result =
            LedgerService::validate_and_resolve(&lines, &base(), usd, unused_rates, |_| true);

        if (debit - credit).abs() <= BALANCE_TOLERANCE {
            prop_assert!(result.is_ok());
        } else {
            let is_unbalanced = matches!(result, Err(LedgerError::Unbalanced { .. }));
            prop_assert!(is_unbalanced);
        }
    }

    // =========================================================================
    // Property 2: Foreign-currency conversion
    // =========================================================================

    /// *For any* foreign amount and rate, the base debit SHALL equal
    /// `round(amount * rate)` and the entered amount SHALL be kept.
    #[test]
    fn prop_foreign_line_converted(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let expected = round_amount(amount * rate, 2);
        let mut usd_line = make_line(amount, Decimal::ZERO);
        usd_line.currency_code = Some("USD".to_string());
        let lines = vec![usd_line, make_line(Decimal::ZERO, expected)];

        let lookup = |_: &str, _: Option<RateTypeId>| {
            Ok::<_, LedgerError>(ResolvedRate {
                from_rate: rate,
                to_rate: Decimal::ONE,
                effective_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                rate_type_id: None,
                source: RateSource::CurrencyRate,
            })
        };

        let (resolved, totals) =
            LedgerService::validate_and_resolve(&lines, &base(), usd, lookup, |_| true).unwrap();

        prop_assert_eq!(resolved[0].debit, expected);
        prop_assert_eq!(resolved[0].fc_debit, amount);
        prop_assert!(totals.is_balanced);
    }

    // =========================================================================
    // Property 3: Settlement round trip
    // =========================================================================

    /// *For any* invoice and settlement not exceeding its outstanding balance,
    /// applying then reversing SHALL restore the original balance.
    #[test]
    fn prop_settlement_round_trip(
        total in positive_amount(),
        paid_ratio in 0u32..=100,
        settle_ratio in 1u32..=100,
    ) {
        let outstanding = round_amount(total * Decimal::from(paid_ratio) / Decimal::from(100), 2);
        let amount = round_amount(outstanding * Decimal::from(settle_ratio) / Decimal::from(100), 2);
        prop_assume!(amount > Decimal::ZERO);

        let invoice = InvoiceBalance {
            id: InvoiceId::new(1),
            kind: RefType::Ar,
            total_amount: total,
            outstanding,
        };
        let delta = super::settlement::SettlementDelta {
            invoice_id: invoice.id,
            ref_type: RefType::Ar,
            amount,
        };

        let posted = SettlementService::adjust(&invoice, &delta, SettlementDirection::Apply).unwrap();
        let after_post = InvoiceBalance { outstanding: posted, ..invoice.clone() };
        let unposted =
            SettlementService::adjust(&after_post, &delta, SettlementDirection::Reverse).unwrap();

        prop_assert_eq!(unposted, outstanding);
        prop_assert!(posted >= Decimal::ZERO);
    }

    // =========================================================================
    // Property 4: State machine
    // =========================================================================

    /// *For any* status, update and delete SHALL be allowed only in Draft,
    /// and post followed by unpost SHALL return to Draft.
    #[test]
    fn prop_only_drafts_are_mutable(status in status_strategy()) {
        let editable = status == JournalStatus::Draft;
        prop_assert_eq!(next_status(status, JournalAction::Update).is_some(), editable);
        prop_assert_eq!(next_status(status, JournalAction::Delete).is_some(), editable);

        if let Some(posted) = next_status(status, JournalAction::Post) {
            prop_assert_eq!(next_status(posted, JournalAction::Unpost), Some(status));
        }
    }
}
