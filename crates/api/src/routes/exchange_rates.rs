//! Exchange rate set and daily currency quote routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::error_response;
use crate::AppState;
use arus_core::currency::{RateStatus, RateWhen};
use arus_db::{
    RateRepository,
    repositories::{CreateCurrencyRateInput, CreateExchangeRateInput, CreateRateLineInput},
};
use arus_shared::types::RateTypeId;

/// Creates the exchange rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/exchange-rates",
            get(get_exchange_rate).post(create_exchange_rate),
        )
        .route("/currency-rates", post(create_currency_rate))
}

/// Query parameters for looking up a rate.
#[derive(Debug, Deserialize)]
pub struct GetExchangeRateQuery {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Date of the rate.
    pub date: NaiveDate,
    /// Restrict to one rate type.
    pub rate_type_id: Option<RateTypeId>,
}

/// One directional line of a rate set.
#[derive(Debug, Deserialize)]
pub struct RateLineRequest {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Units of target per unit of source.
    pub rate: Decimal,
}

/// Request body for creating an exchange rate set.
#[derive(Debug, Deserialize)]
pub struct CreateExchangeRateRequest {
    /// Rate type the set belongs to.
    pub rate_type_id: RateTypeId,
    /// First valid day.
    pub from_date: NaiveDate,
    /// Last valid day.
    pub to_date: NaiveDate,
    /// Free text.
    pub description: Option<String>,
    /// `A`, `C` or `I`; defaults to `A`.
    pub status: Option<RateStatus>,
    /// Directional lines.
    pub lines: Vec<RateLineRequest>,
}

impl From<CreateExchangeRateRequest> for CreateExchangeRateInput {
    fn from(request: CreateExchangeRateRequest) -> Self {
        Self {
            rate_type_id: request.rate_type_id,
            from_date: request.from_date,
            to_date: request.to_date,
            description: request.description,
            status: request.status.unwrap_or(RateStatus::Active),
            lines: request
                .lines
                .into_iter()
                .map(|line| CreateRateLineInput {
                    from_currency: line.from_currency,
                    to_currency: line.to_currency,
                    rate: line.rate,
                })
                .collect(),
        }
    }
}

/// Request body for a daily currency quote against the base currency.
#[derive(Debug, Deserialize)]
pub struct CreateCurrencyRateRequest {
    /// Quoted currency code.
    pub currency_code: String,
    /// Rate type of the quote.
    pub rate_type_id: RateTypeId,
    /// Quote date.
    pub rate_date: NaiveDate,
    /// Buy rate in base currency.
    pub buy_rate: Decimal,
    /// Sell rate in base currency.
    pub sell_rate: Decimal,
    /// Middle rate; the buy/sell average when omitted.
    pub middle_rate: Option<Decimal>,
}

/// Response for a stored rate set.
#[derive(Debug, Serialize)]
pub struct ExchangeRateResponse {
    /// Set ID.
    pub id: i64,
    /// Rate type.
    pub rate_type_id: i64,
    /// First valid day.
    pub from_date: NaiveDate,
    /// Last valid day.
    pub to_date: NaiveDate,
    /// Lifecycle status.
    pub status: RateStatus,
    /// Number of lines stored.
    pub line_count: usize,
}

/// GET `/exchange-rates` - Resolve the rate for a pair on a date.
async fn get_exchange_rate(
    State(state): State<AppState>,
    Query(query): Query<GetExchangeRateQuery>,
) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    match repo
        .resolve(
            &query.from,
            &query.to,
            RateWhen::Date(query.date),
            query.rate_type_id,
        )
        .await
    {
        Ok(rate) => (
            StatusCode::OK,
            Json(json!({
                "from": query.from.to_uppercase(),
                "to": query.to.to_uppercase(),
                "rate": rate,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/exchange-rates` - Create a rate set with its lines.
async fn create_exchange_rate(
    State(state): State<AppState>,
    Json(payload): Json<CreateExchangeRateRequest>,
) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    match repo.create_exchange_rate(payload.into()).await {
        Ok(stored) => {
            info!(
                exchange_rate_id = stored.rate.id,
                lines = stored.lines.len(),
                "Exchange rate set created"
            );
            let response = ExchangeRateResponse {
                id: stored.rate.id,
                rate_type_id: stored.rate.rate_type_id,
                from_date: stored.rate.from_date,
                to_date: stored.rate.to_date,
                status: RateStatus::from(stored.rate.status),
                line_count: stored.lines.len(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST `/currency-rates` - Store a daily quote.
async fn create_currency_rate(
    State(state): State<AppState>,
    Json(payload): Json<CreateCurrencyRateRequest>,
) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    let input = CreateCurrencyRateInput {
        currency_code: payload.currency_code,
        rate_type_id: payload.rate_type_id,
        rate_date: payload.rate_date,
        buy_rate: payload.buy_rate,
        sell_rate: payload.sell_rate,
        middle_rate: payload.middle_rate,
    };

    match repo.create_currency_rate(input).await {
        Ok(quote) => {
            info!(
                currency_rate_id = quote.id,
                rate_date = %quote.rate_date,
                middle_rate = %quote.middle_rate,
                "Currency rate created"
            );
            (StatusCode::CREATED, Json(quote)).into_response()
        }
        Err(e) => error_response(e),
    }
}
