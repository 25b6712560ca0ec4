//! Rate resolution.
//!
//! Given the candidate rows a repository loaded for a query, picks the rate
//! to apply:
//!
//! 1. Same currency: rate 1.
//! 2. A directional exchange rate line `from -> to` whose set is not
//!    inactive, matches the rate type (any if unspecified) and whose validity
//!    range covers the request. For a single date the highest set ID wins;
//!    for a month the latest rate effective inside the month wins.
//! 3. Middle rates of both currencies against the base currency (the base
//!    itself counts as 1), converted as `amount * from_rate / to_rate`.
//! 4. Otherwise `RateNotFound`.

use rust_decimal::Decimal;

use super::conversion::{convert_amount, convert_cross};
use super::error::RateError;
use super::types::{
    Conversion, CurrencyInfo, CurrencyQuote, RateLineCandidate, RateQuery, RateSource, RateWhen,
    ResolvedRate,
};
use arus_shared::types::{CurrencyId, RateTypeId};

/// Stateless rate resolver.
pub struct RateResolver;

impl RateResolver {
    /// Resolves the rate for a query.
    ///
    /// # Errors
    ///
    /// Returns `RateNotFound` when no candidate applies.
    pub fn resolve(
        query: &RateQuery,
        lines: &[RateLineCandidate],
        quotes: &[CurrencyQuote],
    ) -> Result<ResolvedRate, RateError> {
        if query.from.id == query.to.id {
            return Ok(ResolvedRate {
                from_rate: Decimal::ONE,
                to_rate: Decimal::ONE,
                effective_date: query.when.anchor(),
                rate_type_id: query.rate_type,
                source: RateSource::Identity,
            });
        }

        if let Some(line) = Self::pick_line(query, lines) {
            let (start, _) = query.when.bounds();
            return Ok(ResolvedRate {
                from_rate: line.rate,
                to_rate: Decimal::ONE,
                effective_date: match query.when {
                    RateWhen::Date(_) => line.from_date,
                    RateWhen::Month(_) => line.from_date.max(start),
                },
                rate_type_id: Some(line.rate_type_id),
                source: RateSource::ExchangeRate {
                    exchange_rate_id: line.exchange_rate_id,
                },
            });
        }

        for rate_type in Self::quote_rate_types(query, lines, quotes) {
            let from_side = Self::quote_side(query, &query.from, rate_type, quotes);
            let to_side = Self::quote_side(query, &query.to, rate_type, quotes);

            if let (Some((from_rate, from_date)), Some((to_rate, to_date))) = (from_side, to_side)
            {
                // Older of the two dates, matching how a cross rate ages
                let effective_date = match (from_date, to_date) {
                    (Some(a), Some(b)) => a.min(b),
                    (Some(d), None) | (None, Some(d)) => d,
                    (None, None) => query.when.anchor(),
                };
                return Ok(ResolvedRate {
                    from_rate,
                    to_rate,
                    effective_date,
                    rate_type_id: rate_type,
                    source: RateSource::CurrencyRate,
                });
            }
        }

        Err(Self::not_found(query))
    }

    /// Resolves the rate and converts `amount` into the target currency.
    ///
    /// # Errors
    ///
    /// Returns `RateNotFound` or `Overflow`.
    pub fn convert(
        query: &RateQuery,
        amount: Decimal,
        lines: &[RateLineCandidate],
        quotes: &[CurrencyQuote],
    ) -> Result<Conversion, RateError> {
        let rate = Self::resolve(query, lines, quotes)?;
        let result = Self::apply(&rate, amount, query.to.decimal_places)?;

        Ok(Conversion {
            from: query.from.code.clone(),
            to: query.to.code.clone(),
            amount,
            result,
            rate,
        })
    }

    /// Applies a resolved rate to an amount.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` if the multiplication or division overflows.
    pub fn apply(
        rate: &ResolvedRate,
        amount: Decimal,
        decimal_places: u32,
    ) -> Result<Decimal, RateError> {
        let converted = if rate.to_rate == Decimal::ONE {
            convert_amount(amount, rate.from_rate, decimal_places)
        } else {
            convert_cross(amount, rate.from_rate, rate.to_rate, decimal_places)
        };
        converted.ok_or_else(|| RateError::Overflow(amount.to_string()))
    }

    /// Picks the directional line that applies to the query.
    fn pick_line<'a>(
        query: &RateQuery,
        lines: &'a [RateLineCandidate],
    ) -> Option<&'a RateLineCandidate> {
        let (start, end) = query.when.bounds();
        let eligible = lines.iter().filter(|line| {
            line.from_currency_id == query.from.id
                && line.to_currency_id == query.to.id
                && line.status.is_usable()
                && line.rate > Decimal::ZERO
                && matches_type(query.rate_type, line.rate_type_id)
                && line.from_date <= end
                && line.to_date >= start
        });

        match query.when {
            RateWhen::Date(_) => eligible.max_by_key(|line| line.exchange_rate_id),
            RateWhen::Month(_) => {
                eligible.max_by_key(|line| (line.from_date.max(start), line.exchange_rate_id))
            }
        }
    }

    /// Rate types to try for a quote-based conversion, in order.
    ///
    /// Both legs always come from one rate type. Without a requested type the
    /// type of the newest exchange rate set for the pair is tried first, then
    /// every quoted type by ascending ID.
    fn quote_rate_types(
        query: &RateQuery,
        lines: &[RateLineCandidate],
        quotes: &[CurrencyQuote],
    ) -> Vec<Option<RateTypeId>> {
        if query.rate_type.is_some() {
            return vec![query.rate_type];
        }

        let preferred = lines
            .iter()
            .filter(|line| {
                line.from_currency_id == query.from.id && line.to_currency_id == query.to.id
            })
            .max_by_key(|line| line.exchange_rate_id)
            .map(|line| line.rate_type_id);

        let mut quoted: Vec<RateTypeId> = quotes.iter().map(|q| q.rate_type_id).collect();
        quoted.sort_unstable();
        quoted.dedup();

        let mut types: Vec<Option<RateTypeId>> = preferred.into_iter().map(Some).collect();
        types.extend(
            quoted
                .into_iter()
                .filter(|t| Some(*t) != preferred)
                .map(Some),
        );
        if types.is_empty() {
            // Base to base never needs a quote
            types.push(None);
        }
        types
    }

    /// Returns `(middle_rate, quote_date)` for one side of a quote-based
    /// conversion. The base currency always resolves to 1.
    fn quote_side(
        query: &RateQuery,
        currency: &CurrencyInfo,
        rate_type: Option<RateTypeId>,
        quotes: &[CurrencyQuote],
    ) -> Option<(Decimal, Option<chrono::NaiveDate>)> {
        if currency.id == query.base.id {
            return Some((Decimal::ONE, None));
        }
        Self::pick_quote(query, currency.id, rate_type, quotes)
            .map(|quote| (quote.middle_rate, Some(quote.rate_date)))
    }

    /// Picks the latest middle rate for a currency inside the query bounds.
    fn pick_quote<'a>(
        query: &RateQuery,
        currency_id: CurrencyId,
        rate_type: Option<RateTypeId>,
        quotes: &'a [CurrencyQuote],
    ) -> Option<&'a CurrencyQuote> {
        let (start, end) = query.when.bounds();
        quotes
            .iter()
            .filter(|quote| {
                quote.currency_id == currency_id
                    && quote.middle_rate > Decimal::ZERO
                    && matches_type(rate_type, quote.rate_type_id)
                    && quote.rate_date >= start
                    && quote.rate_date <= end
            })
            .max_by_key(|quote| (quote.rate_date, quote.id))
    }

    fn not_found(query: &RateQuery) -> RateError {
        RateError::RateNotFound {
            from: query.from.code.clone(),
            to: query.to.code.clone(),
            when: query.when.to_string(),
        }
    }
}

fn matches_type(wanted: Option<RateTypeId>, actual: RateTypeId) -> bool {
    wanted.is_none_or(|t| t == actual)
}
