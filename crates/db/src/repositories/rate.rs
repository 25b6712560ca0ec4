//! Rate repository: currency lookups, rate resolution and rate maintenance.
//!
//! Candidate rows are loaded with SQL bounded to the requested date or month;
//! the choice between them is made by [`RateResolver`].

use arus_core::currency::{
    Conversion, CurrencyInfo, CurrencyQuote, RateError, RateLineCandidate, RateQuery,
    RateResolver, RateStatus, RateWhen, ResolvedRate, resolve_quote_middle, validate_rate_set,
};
use arus_shared::types::{CurrencyId, ExchangeRateId, RateTypeId};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::db_error::is_unique_violation;
use crate::entities::{
    currencies, currency_rates, exchange_rate_lines, exchange_rates, rate_types,
    sea_orm_active_enums::ExchangeRateStatus,
};

fn db_err(err: DbErr) -> RateError {
    RateError::Database(err.to_string())
}

/// Converts a currency row into the core currency info.
#[must_use]
pub fn to_currency_info(model: &currencies::Model) -> CurrencyInfo {
    CurrencyInfo {
        id: CurrencyId::new(model.id),
        code: model.code.clone(),
        decimal_places: u32::try_from(model.decimal_places).unwrap_or_default(),
        is_base: model.is_base,
    }
}

/// Input for one directional line of an exchange rate set.
#[derive(Debug, Clone)]
pub struct CreateRateLineInput {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// `1 from = rate to`.
    pub rate: Decimal,
}

/// Input for an exchange rate set.
#[derive(Debug, Clone)]
pub struct CreateExchangeRateInput {
    /// Rate type.
    pub rate_type_id: RateTypeId,
    /// First valid day.
    pub from_date: NaiveDate,
    /// Last valid day.
    pub to_date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// Initial status.
    pub status: RateStatus,
    /// Directional lines.
    pub lines: Vec<CreateRateLineInput>,
}

/// Input for a daily currency quote against the base currency.
#[derive(Debug, Clone)]
pub struct CreateCurrencyRateInput {
    /// Quoted currency code.
    pub currency_code: String,
    /// Rate type.
    pub rate_type_id: RateTypeId,
    /// Quote date.
    pub rate_date: NaiveDate,
    /// Buy rate.
    pub buy_rate: Decimal,
    /// Sell rate.
    pub sell_rate: Decimal,
    /// Middle rate; defaults to the average of buy and sell.
    pub middle_rate: Option<Decimal>,
}

/// A stored exchange rate set with its lines.
#[derive(Debug, Clone)]
pub struct ExchangeRateWithLines {
    /// Header.
    pub rate: exchange_rates::Model,
    /// Lines in `line_no` order.
    pub lines: Vec<exchange_rate_lines::Model>,
}

/// Rate repository.
#[derive(Debug, Clone)]
pub struct RateRepository {
    db: DatabaseConnection,
}

impl RateRepository {
    /// Creates a new rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists currencies, base currency first.
    ///
    /// # Errors
    ///
    /// Returns `Database` on failure.
    pub async fn list_currencies(&self) -> Result<Vec<currencies::Model>, RateError> {
        currencies::Entity::find()
            .order_by_desc(currencies::Column::IsBase)
            .order_by_asc(currencies::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Returns the base (book) currency.
    ///
    /// # Errors
    ///
    /// Returns `BaseCurrencyMissing` or `Database`.
    pub async fn base_currency(&self) -> Result<CurrencyInfo, RateError> {
        Self::base_currency_in(&self.db).await
    }

    /// Returns the base currency using the given connection.
    ///
    /// # Errors
    ///
    /// Returns `BaseCurrencyMissing` or `Database`.
    pub async fn base_currency_in<C: ConnectionTrait>(conn: &C) -> Result<CurrencyInfo, RateError> {
        currencies::Entity::find()
            .filter(currencies::Column::IsBase.eq(true))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(|m| to_currency_info(&m))
            .ok_or(RateError::BaseCurrencyMissing)
    }

    /// Looks a currency up by code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `CurrencyNotFound` or `Database`.
    pub async fn currency_in<C: ConnectionTrait>(
        conn: &C,
        code: &str,
    ) -> Result<CurrencyInfo, RateError> {
        let code = code.trim().to_uppercase();
        currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code.as_str()))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(|m| to_currency_info(&m))
            .ok_or(RateError::CurrencyNotFound(code))
    }

    /// Resolves the rate between two currency codes.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyNotFound`, `BaseCurrencyMissing`, `RateNotFound` or
    /// `Database`.
    pub async fn resolve(
        &self,
        from: &str,
        to: &str,
        when: RateWhen,
        rate_type: Option<RateTypeId>,
    ) -> Result<ResolvedRate, RateError> {
        let query = self.build_query(from, to, when, rate_type).await?;
        Self::resolve_in(&self.db, &query).await
    }

    /// Converts an amount between two currency codes.
    ///
    /// # Errors
    ///
    /// Same as [`RateRepository::resolve`], plus `Overflow`.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        when: RateWhen,
        rate_type: Option<RateTypeId>,
    ) -> Result<Conversion, RateError> {
        let query = self.build_query(from, to, when, rate_type).await?;
        let (lines, quotes) = Self::load_candidates(&self.db, &query).await?;
        let conversion = RateResolver::convert(&query, amount, &lines, &quotes)?;

        debug!(
            from = %conversion.from,
            to = %conversion.to,
            %amount,
            result = %conversion.result,
            when = %when,
            "Converted amount"
        );
        Ok(conversion)
    }

    async fn build_query(
        &self,
        from: &str,
        to: &str,
        when: RateWhen,
        rate_type: Option<RateTypeId>,
    ) -> Result<RateQuery, RateError> {
        Ok(RateQuery {
            from: Self::currency_in(&self.db, from).await?,
            to: Self::currency_in(&self.db, to).await?,
            base: Self::base_currency_in(&self.db).await?,
            when,
            rate_type,
        })
    }

    /// Resolves a prepared query using the given connection.
    ///
    /// # Errors
    ///
    /// Returns `RateNotFound` or `Database`.
    pub async fn resolve_in<C: ConnectionTrait>(
        conn: &C,
        query: &RateQuery,
    ) -> Result<ResolvedRate, RateError> {
        let (lines, quotes) = Self::load_candidates(conn, query).await?;
        RateResolver::resolve(query, &lines, &quotes)
    }

    /// Loads the exchange rate lines and quotes that could answer a query.
    async fn load_candidates<C: ConnectionTrait>(
        conn: &C,
        query: &RateQuery,
    ) -> Result<(Vec<RateLineCandidate>, Vec<CurrencyQuote>), RateError> {
        if query.from.id == query.to.id {
            return Ok((Vec::new(), Vec::new()));
        }
        let (start, end) = query.when.bounds();

        let mut line_query = exchange_rate_lines::Entity::find()
            .find_also_related(exchange_rates::Entity)
            .filter(exchange_rate_lines::Column::FromCurrencyId.eq(query.from.id.into_inner()))
            .filter(exchange_rate_lines::Column::ToCurrencyId.eq(query.to.id.into_inner()))
            .filter(exchange_rates::Column::Status.ne(ExchangeRateStatus::I))
            .filter(exchange_rates::Column::FromDate.lte(end))
            .filter(exchange_rates::Column::ToDate.gte(start));
        if let Some(rate_type) = query.rate_type {
            line_query =
                line_query.filter(exchange_rates::Column::RateTypeId.eq(rate_type.into_inner()));
        }

        let lines = line_query
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .filter_map(|(line, header)| {
                header.map(|header| RateLineCandidate {
                    exchange_rate_id: ExchangeRateId::new(header.id),
                    rate_type_id: RateTypeId::new(header.rate_type_id),
                    from_date: header.from_date,
                    to_date: header.to_date,
                    status: header.status.into(),
                    from_currency_id: CurrencyId::new(line.from_currency_id),
                    to_currency_id: CurrencyId::new(line.to_currency_id),
                    rate: line.rate,
                })
            })
            .collect();

        let mut quote_query = currency_rates::Entity::find()
            .filter(
                currency_rates::Column::CurrencyId
                    .is_in([query.from.id.into_inner(), query.to.id.into_inner()]),
            )
            .filter(currency_rates::Column::RateDate.between(start, end));
        if let Some(rate_type) = query.rate_type {
            quote_query =
                quote_query.filter(currency_rates::Column::RateTypeId.eq(rate_type.into_inner()));
        }

        let quotes = quote_query
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|q| CurrencyQuote {
                id: q.id,
                currency_id: CurrencyId::new(q.currency_id),
                rate_type_id: RateTypeId::new(q.rate_type_id),
                rate_date: q.rate_date,
                buy_rate: q.buy_rate,
                sell_rate: q.sell_rate,
                middle_rate: q.middle_rate,
            })
            .collect();

        Ok((lines, quotes))
    }

    /// Lists rate types.
    ///
    /// # Errors
    ///
    /// Returns `Database` on failure.
    pub async fn list_rate_types(&self) -> Result<Vec<rate_types::Model>, RateError> {
        rate_types::Entity::find()
            .order_by_asc(rate_types::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Stores an exchange rate set and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns validation errors from `validate_rate_set`, `CurrencyNotFound`
    /// or `Database`.
    pub async fn create_exchange_rate(
        &self,
        input: CreateExchangeRateInput,
    ) -> Result<ExchangeRateWithLines, RateError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut resolved = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let from = Self::currency_in(&txn, &line.from_currency).await?;
            let to = Self::currency_in(&txn, &line.to_currency).await?;
            resolved.push((from.id, to.id, line.rate));
        }
        validate_rate_set(input.from_date, input.to_date, &resolved)?;

        let header = exchange_rates::ActiveModel {
            rate_type_id: Set(input.rate_type_id.into_inner()),
            from_date: Set(input.from_date),
            to_date: Set(input.to_date),
            description: Set(input.description),
            status: Set(input.status.into()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let mut lines = Vec::with_capacity(resolved.len());
        for (index, (from, to, rate)) in resolved.into_iter().enumerate() {
            let line = exchange_rate_lines::ActiveModel {
                exchange_rate_id: Set(header.id),
                line_no: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                from_currency_id: Set(from.into_inner()),
                to_currency_id: Set(to.into_inner()),
                rate: Set(rate),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            lines.push(line);
        }

        txn.commit().await.map_err(db_err)?;

        info!(
            exchange_rate_id = header.id,
            from_date = %header.from_date,
            to_date = %header.to_date,
            lines = lines.len(),
            "Created exchange rate set"
        );
        Ok(ExchangeRateWithLines { rate: header, lines })
    }

    /// Stores a daily quote; one per currency, rate type and date.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRate`, `CurrencyNotFound`, `DuplicateQuote` or
    /// `Database`.
    pub async fn create_currency_rate(
        &self,
        input: CreateCurrencyRateInput,
    ) -> Result<currency_rates::Model, RateError> {
        let middle = resolve_quote_middle(input.buy_rate, input.sell_rate, input.middle_rate)?;
        let currency = Self::currency_in(&self.db, &input.currency_code).await?;

        let model = currency_rates::ActiveModel {
            currency_id: Set(currency.id.into_inner()),
            rate_type_id: Set(input.rate_type_id.into_inner()),
            rate_date: Set(input.rate_date),
            buy_rate: Set(input.buy_rate),
            sell_rate: Set(input.sell_rate),
            middle_rate: Set(middle),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let inserted = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                RateError::DuplicateQuote {
                    code: currency.code.clone(),
                    date: input.rate_date,
                }
            } else {
                db_err(e)
            }
        })?;

        info!(
            currency = %currency.code,
            rate_date = %inserted.rate_date,
            middle_rate = %inserted.middle_rate,
            "Stored currency rate"
        );
        Ok(inserted)
    }
}
