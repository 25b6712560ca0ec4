//! Property-based tests for line validation.
//!
//! - Property 1: Amounts within a currency's decimal places are accepted
//! - Property 2: Amounts with extra decimals are rejected
//! - Property 3: Trailing zeros never count as decimals

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::JournalLineInput;
use super::validation::{fits_scale, validate_precision};
use crate::currency::CurrencyInfo;
use arus_shared::types::{AccountId, CurrencyId};

fn currency(decimal_places: u32) -> CurrencyInfo {
    CurrencyInfo {
        id: CurrencyId::new(1),
        code: "XXX".to_string(),
        decimal_places,
        is_base: false,
    }
}

fn debit_line(amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        coa_id: AccountId::new(101),
        description: None,
        debit: amount,
        credit: Decimal::ZERO,
        ref_id: None,
        ref_type: None,
        partner_id: None,
        currency_code: None,
        rate_type_id: None,
        exchange_rate: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* currency with 0-4 decimal places and any amount using at
    /// most that many, the line SHALL be accepted.
    #[test]
    fn prop_amount_within_scale_accepted(
        decimal_places in 0u32..=4,
        units in 0i64..1_000_000_000i64,
    ) {
        let amount = Decimal::new(units, decimal_places);
        prop_assert!(validate_precision(1, &debit_line(amount), &currency(decimal_places)).is_ok());
    }

    /// *For any* amount whose last decimal is non-zero beyond the currency's
    /// decimal places, the line SHALL be rejected with `ExcessPrecision`.
    #[test]
    fn prop_amount_beyond_scale_rejected(
        decimal_places in 0u32..=4,
        extra in 1u32..=4,
        units in 1i64..1_000_000_000i64,
    ) {
        // Ending in 1 keeps the full scale after normalization
        let amount = Decimal::new(units * 10 + 1, decimal_places + extra);
        let result = validate_precision(2, &debit_line(amount), &currency(decimal_places));

        let rejected = matches!(
            result,
            Err(LedgerError::ExcessPrecision { line_no: 2, decimal_places: dp, .. })
                if dp == decimal_places
        );
        prop_assert!(rejected);
    }

    /// *For any* whole amount padded with trailing zeros, it SHALL fit a
    /// currency with no decimals.
    #[test]
    fn prop_trailing_zeros_ignored(
        units in 0i64..1_000_000_000i64,
        padding in 0u32..=6,
    ) {
        let amount = Decimal::new(units * 10i64.pow(padding), padding);
        prop_assert!(fits_scale(amount, 0));
    }
}
