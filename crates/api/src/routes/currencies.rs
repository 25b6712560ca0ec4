//! Currency listing and conversion routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::error_response;
use crate::AppState;
use arus_core::currency::{MonthRef, RateError, RateWhen};
use arus_db::RateRepository;
use arus_shared::{AppError, types::RateTypeId};

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies))
        .route("/currencies/convert", get(convert))
        .route("/rate-types", get(list_rate_types))
}

/// Query parameters for a conversion.
///
/// Either `date`, or `year` together with `month`, selects the rate.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Amount in the source currency.
    pub amount: Decimal,
    /// Exact day.
    pub date: Option<NaiveDate>,
    /// Year of a month request.
    pub year: Option<i32>,
    /// Month (1-12) of a month request.
    pub month: Option<u32>,
    /// Restrict to one rate type.
    pub rate_type_id: Option<RateTypeId>,
}

impl ConvertQuery {
    fn when(&self) -> Result<RateWhen, AppError> {
        match (self.date, self.year, self.month) {
            (Some(date), None, None) => Ok(RateWhen::Date(date)),
            (None, Some(year), Some(month)) => MonthRef::new(year, month)
                .map(RateWhen::Month)
                .ok_or_else(|| RateError::InvalidMonth { year, month }.into()),
            _ => Err(AppError::Validation(
                "Provide either date or both year and month".to_string(),
            )),
        }
    }
}

/// GET `/currencies` - List currencies.
async fn list_currencies(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    match repo.list_currencies().await {
        Ok(currencies) => {
            (StatusCode::OK, Json(json!({ "currencies": currencies }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/currencies/convert` - Convert an amount at a date or month.
async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> impl IntoResponse {
    let when = match query.when() {
        Ok(when) => when,
        Err(e) => return error_response(e),
    };

    let repo = RateRepository::new((*state.db).clone());

    match repo
        .convert(&query.from, &query.to, query.amount, when, query.rate_type_id)
        .await
    {
        Ok(conversion) => (StatusCode::OK, Json(conversion)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/rate-types` - List rate types.
async fn list_rate_types(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    match repo.list_rate_types().await {
        Ok(rate_types) => {
            (StatusCode::OK, Json(json!({ "rate_types": rate_types }))).into_response()
        }
        Err(e) => error_response(e),
    }
}
