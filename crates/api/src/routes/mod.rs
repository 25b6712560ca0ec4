//! API route definitions.

use arus_shared::AppError;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::AppState;

pub mod accounting_periods;
pub mod currencies;
pub mod exchange_rates;
pub mod health;
pub mod journals;
pub mod transcodes;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transcodes::routes())
        .merge(journals::routes())
        .merge(currencies::routes())
        .merge(exchange_rates::routes())
        .merge(accounting_periods::routes())
}

/// Renders a domain error as `{error, message}` with its HTTP status.
pub(crate) fn error_response(err: impl Into<AppError>) -> Response {
    let err = err.into();
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        error!(error = %err, code = err.error_code(), "Request failed");
    } else {
        warn!(error = %err, code = err.error_code(), "Request rejected");
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.message(),
        })),
    )
        .into_response()
}
