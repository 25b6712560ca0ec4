//! Ledger service for journal validation and resolution.
//!
//! Pure business logic: repositories load accounts and rates, pass them in
//! as lookups, and persist whatever this service returns.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{JournalLineInput, JournalTotals, ResolvedLine};
use super::validation::{MIN_LINES, validate_lines, validate_precision};
use crate::currency::{CurrencyInfo, RateError, RateResolver, ResolvedRate, convert_amount};
use arus_shared::types::{AccountId, RateTypeId};

/// Ledger service for journal validation and resolution.
pub struct LedgerService;

impl LedgerService {
    /// Validate and resolve journal lines before persisting.
    ///
    /// 1. Validates line count and per-line rules
    /// 2. Checks every account exists and every amount fits its currency's
    ///    decimal places
    /// 3. Converts foreign-currency lines into the base currency at the
    ///    journal date (explicit rate, or `rate_lookup`)
    /// 4. Validates the balance in base currency
    ///
    /// # Arguments
    ///
    /// * `lines` - Lines as submitted
    /// * `base` - The book (base) currency
    /// * `currency_lookup` - Resolves a foreign currency code
    /// * `rate_lookup` - Resolves `(currency_code, rate_type)` to a rate into base
    /// * `account_exists` - Returns true if the account exists
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn validate_and_resolve<C, R, A>(
        lines: &[JournalLineInput],
        base: &CurrencyInfo,
        currency_lookup: C,
        rate_lookup: R,
        account_exists: A,
    ) -> Result<(Vec<ResolvedLine>, JournalTotals), LedgerError>
    where
        C: Fn(&str) -> Result<CurrencyInfo, LedgerError>,
        R: Fn(&str, Option<RateTypeId>) -> Result<ResolvedRate, LedgerError>,
        A: Fn(AccountId) -> bool,
    {
        validate_lines(lines)?;

        let mut resolved = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            resolved.push(Self::resolve_line(
                index,
                line,
                base,
                &currency_lookup,
                &rate_lookup,
                &account_exists,
            )?);
        }

        let totals = Self::ensure_balanced(&resolved)?;
        Ok((resolved, totals))
    }

    fn resolve_line<C, R, A>(
        index: usize,
        line: &JournalLineInput,
        base: &CurrencyInfo,
        currency_lookup: &C,
        rate_lookup: &R,
        account_exists: &A,
    ) -> Result<ResolvedLine, LedgerError>
    where
        C: Fn(&str) -> Result<CurrencyInfo, LedgerError>,
        R: Fn(&str, Option<RateTypeId>) -> Result<ResolvedRate, LedgerError>,
        A: Fn(AccountId) -> bool,
    {
        if !account_exists(line.coa_id) {
            return Err(LedgerError::AccountNotFound(line.coa_id));
        }

        let currency_code = line
            .currency_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map_or_else(|| base.code.clone(), str::to_uppercase);

        let foreign;
        let currency = if currency_code == base.code {
            base
        } else {
            foreign = currency_lookup(&currency_code)?;
            &foreign
        };
        validate_precision(index + 1, line, currency)?;

        let (debit, credit, exchange_rate, rate_type_id) = if currency_code == base.code {
            (line.debit, line.credit, Decimal::ONE, None)
        } else if let Some(rate) = line.exchange_rate {
            let to_base = |amount: Decimal| {
                convert_amount(amount, rate, base.decimal_places)
                    .ok_or_else(|| RateError::Overflow(amount.to_string()))
            };
            (
                to_base(line.debit)?,
                to_base(line.credit)?,
                rate,
                line.rate_type_id,
            )
        } else {
            let resolved = rate_lookup(&currency_code, line.rate_type_id)?;
            let effective = resolved
                .from_rate
                .checked_div(resolved.to_rate)
                .ok_or_else(|| RateError::InvalidRate(resolved.to_rate.to_string()))?;
            (
                RateResolver::apply(&resolved, line.debit, base.decimal_places)?,
                RateResolver::apply(&resolved, line.credit, base.decimal_places)?,
                effective,
                resolved.rate_type_id,
            )
        };

        Ok(ResolvedLine {
            line_no: i32::try_from(index + 1).unwrap_or(i32::MAX),
            coa_id: line.coa_id,
            description: line.description.clone(),
            debit,
            credit,
            currency_code,
            exchange_rate,
            fc_debit: line.debit,
            fc_credit: line.credit,
            rate_type_id,
            ref_id: line.ref_id,
            ref_type: line.ref_type,
            partner_id: line.partner_id,
        })
    }

    /// Calculate journal totals from resolved lines.
    #[must_use]
    pub fn calculate_totals(lines: &[ResolvedLine]) -> JournalTotals {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

        JournalTotals::new(total_debit, total_credit)
    }

    /// Calculates totals and rejects an unbalanced journal.
    ///
    /// # Errors
    ///
    /// Returns `Unbalanced` if `|debit - credit| > 0.01`.
    pub fn ensure_balanced(lines: &[ResolvedLine]) -> Result<JournalTotals, LedgerError> {
        let totals = Self::calculate_totals(lines);
        if !totals.is_balanced {
            return Err(LedgerError::Unbalanced {
                debit: totals.total_debit,
                credit: totals.total_credit,
                difference: totals.difference,
            });
        }
        Ok(totals)
    }

    /// Re-validates stored lines right before posting.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientLines`, `NothingToPost` or `Unbalanced`.
    pub fn validate_for_posting(lines: &[ResolvedLine]) -> Result<JournalTotals, LedgerError> {
        if lines.len() < MIN_LINES {
            return Err(LedgerError::InsufficientLines(lines.len()));
        }
        if lines.iter().all(ResolvedLine::is_zero) {
            return Err(LedgerError::NothingToPost);
        }
        Self::ensure_balanced(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateSource;
    use arus_shared::types::{CurrencyId, ExchangeRateId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn idr() -> CurrencyInfo {
        CurrencyInfo {
            id: CurrencyId::new(1),
            code: "IDR".to_string(),
            decimal_places: 0,
            is_base: true,
        }
    }

    fn make_line(coa: i64, debit: Decimal, credit: Decimal) -> JournalLineInput {
        JournalLineInput {
            coa_id: AccountId::new(coa),
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

    fn usd_rate() -> ResolvedRate {
        ResolvedRate {
            from_rate: dec!(16250),
            to_rate: Decimal::ONE,
            effective_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            rate_type_id: Some(RateTypeId::new(1)),
            source: RateSource::ExchangeRate {
                exchange_rate_id: ExchangeRateId::new(3),
            },
        }
    }

    fn no_rates(code: &str, _: Option<RateTypeId>) -> Result<ResolvedRate, LedgerError> {
        Err(RateError::RateNotFound {
            from: code.to_string(),
            to: "IDR".to_string(),
            when: "2025-06-15".to_string(),
        }
        .into())
    }

    fn usd_only(code: &str) -> Result<CurrencyInfo, LedgerError> {
        if code == "USD" {
            Ok(CurrencyInfo {
                id: CurrencyId::new(2),
                code: "USD".to_string(),
                decimal_places: 2,
                is_base: false,
            })
        } else {
            Err(RateError::CurrencyNotFound(code.to_string()).into())
        }
    }

    fn all_accounts(_: AccountId) -> bool {
        true
    }

    #[test]
    fn test_balanced_base_journal() {
        let lines = vec![
            make_line(101, dec!(100000), dec!(0)),
            make_line(201, dec!(0), dec!(100000)),
        ];

        let (resolved, totals) = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            no_rates,
            all_accounts,
        )
        .unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].line_no, 1);
        assert_eq!(resolved[1].line_no, 2);
        assert_eq!(resolved[0].currency_code, "IDR");
        assert_eq!(resolved[0].exchange_rate, Decimal::ONE);
        assert!(totals.is_balanced);
        assert_eq!(totals.total_debit, dec!(100000));
    }

    #[test]
    fn test_unbalanced_journal() {
        let lines = vec![
            make_line(101, dec!(100000), dec!(0)),
            make_line(201, dec!(0), dec!(99000)),
        ];

        let result = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            no_rates,
            all_accounts,
        );

        assert!(matches!(
            result,
            Err(LedgerError::Unbalanced { difference, .. }) if difference == dec!(1000)
        ));
    }

    #[test]
    fn test_unknown_account_reported_by_id() {
        let lines = vec![
            make_line(101, dec!(100), dec!(0)),
            make_line(999, dec!(0), dec!(100)),
        ];

        let result = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            no_rates,
            |id| id.into_inner() != 999,
        );

        assert!(matches!(result, Err(LedgerError::AccountNotFound(id)) if id.into_inner() == 999));
    }

    #[test]
    fn test_foreign_line_resolved_to_base() {
        let mut usd = make_line(102, dec!(100), dec!(0));
        usd.currency_code = Some("usd".to_string());
        let lines = vec![usd, make_line(201, dec!(0), dec!(1625000))];

        let (resolved, totals) = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            |_, _| Ok(usd_rate()),
            all_accounts,
        )
        .unwrap();

        assert_eq!(resolved[0].currency_code, "USD");
        assert_eq!(resolved[0].fc_debit, dec!(100));
        assert_eq!(resolved[0].debit, dec!(1625000));
        assert_eq!(resolved[0].exchange_rate, dec!(16250));
        assert_eq!(resolved[0].rate_type_id, Some(RateTypeId::new(1)));
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_explicit_rate_skips_lookup() {
        let mut usd = make_line(102, dec!(10), dec!(0));
        usd.currency_code = Some("USD".to_string());
        usd.exchange_rate = Some(dec!(16000));
        let lines = vec![usd, make_line(201, dec!(0), dec!(160000))];

        let (resolved, _) = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            no_rates,
            all_accounts,
        )
        .unwrap();

        assert_eq!(resolved[0].debit, dec!(160000));
    }

    #[test]
    fn test_missing_rate_propagates() {
        let mut usd = make_line(102, dec!(10), dec!(0));
        usd.currency_code = Some("USD".to_string());
        let lines = vec![usd, make_line(201, dec!(0), dec!(160000))];

        let result = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            no_rates,
            all_accounts,
        );

        assert!(matches!(result, Err(LedgerError::Rate(RateError::RateNotFound { .. }))));
    }

    #[test]
    fn test_fractional_base_amount_rejected() {
        let lines = vec![
            make_line(101, dec!(100.5), dec!(0)),
            make_line(201, dec!(0), dec!(100.5)),
        ];

        let result =
            LedgerService::validate_and_resolve(&lines, &idr(), usd_only, no_rates, all_accounts);

        assert!(matches!(
            result,
            Err(LedgerError::ExcessPrecision { line_no: 1, ref currency, .. }) if currency == "IDR"
        ));
    }

    #[test]
    fn test_foreign_amount_checked_against_its_currency() {
        let mut usd = make_line(102, dec!(10.125), dec!(0));
        usd.currency_code = Some("USD".to_string());
        usd.exchange_rate = Some(dec!(16000));
        let lines = vec![usd, make_line(201, dec!(0), dec!(162000))];

        let result =
            LedgerService::validate_and_resolve(&lines, &idr(), usd_only, no_rates, all_accounts);

        assert!(matches!(
            result,
            Err(LedgerError::ExcessPrecision { line_no: 1, decimal_places: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_line_currency_rejected() {
        let mut eur = make_line(102, dec!(10), dec!(0));
        eur.currency_code = Some("EUR".to_string());
        eur.exchange_rate = Some(dec!(17000));
        let lines = vec![eur, make_line(201, dec!(0), dec!(170000))];

        let result =
            LedgerService::validate_and_resolve(&lines, &idr(), usd_only, no_rates, all_accounts);

        assert!(matches!(result, Err(LedgerError::Rate(RateError::CurrencyNotFound(_)))));
    }

    #[test]
    fn test_validate_for_posting_rejects_all_zero() {
        let lines = vec![
            make_line(101, dec!(0), dec!(0)),
            make_line(201, dec!(0), dec!(0)),
        ];
        let (resolved, _) = LedgerService::validate_and_resolve(
            &lines,
            &idr(),
            usd_only,
            no_rates,
            all_accounts,
        )
        .unwrap();

        assert!(matches!(
            LedgerService::validate_for_posting(&resolved),
            Err(LedgerError::NothingToPost)
        ));
    }
}
