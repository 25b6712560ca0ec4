//! Accounting period routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::error_response;
use crate::AppState;
use arus_core::period::{AccountingPeriod, PeriodStatus};
use arus_db::{PeriodRepository, repositories::CreatePeriodInput};
use arus_shared::types::PeriodId;

/// Creates the accounting period routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounting-periods",
            get(list_periods).post(create_period),
        )
        .route("/accounting-periods/resolve", get(resolve_period))
        .route("/accounting-periods/{id}/status", patch(update_period_status))
}

/// Request body for creating a period.
#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    /// Display name (e.g., "June 2025").
    pub name: String,
    /// Start date (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// End date (YYYY-MM-DD).
    pub end_date: NaiveDate,
    /// Initial status; open when omitted.
    pub status: Option<PeriodStatus>,
}

/// Request body for updating period status.
#[derive(Debug, Deserialize)]
pub struct UpdatePeriodStatusRequest {
    /// New status: "open" or "closed".
    pub status: PeriodStatus,
}

/// Query parameters for resolving a date.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Date to look up.
    pub date: NaiveDate,
}

/// Which period a date falls in and whether it accepts postings.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// The date looked up.
    pub date: NaiveDate,
    /// Covering period, if any.
    pub period: Option<AccountingPeriod>,
    /// Whether a journal dated `date` may be posted.
    pub posting_allowed: bool,
}

impl ResolveResponse {
    fn new(date: NaiveDate, period: Option<AccountingPeriod>) -> Self {
        let posting_allowed = period.as_ref().is_some_and(AccountingPeriod::is_open);
        Self {
            date,
            period,
            posting_allowed,
        }
    }
}

/// GET `/accounting-periods` - List periods by start date.
async fn list_periods(State(state): State<AppState>) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo.list().await {
        Ok(periods) => (StatusCode::OK, Json(json!({ "periods": periods }))).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/accounting-periods` - Create a period that overlaps no other.
async fn create_period(
    State(state): State<AppState>,
    Json(payload): Json<CreatePeriodRequest>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    let input = CreatePeriodInput {
        name: payload.name,
        start_date: payload.start_date,
        end_date: payload.end_date,
        status: payload.status.unwrap_or(PeriodStatus::Open),
    };

    match repo.create(input).await {
        Ok(period) => {
            info!(
                period_id = %period.id,
                start_date = %period.start_date,
                end_date = %period.end_date,
                "Accounting period created"
            );
            (StatusCode::CREATED, Json(period)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// PATCH `/accounting-periods/{id}/status` - Open or close a period.
async fn update_period_status(
    State(state): State<AppState>,
    Path(id): Path<PeriodId>,
    Json(payload): Json<UpdatePeriodStatusRequest>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo.set_status(id, payload.status).await {
        Ok(period) => {
            info!(
                period_id = %id,
                status = period.status.as_str(),
                "Accounting period status updated"
            );
            (StatusCode::OK, Json(period)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/accounting-periods/resolve` - Period covering a date.
async fn resolve_period(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo.resolve(query.date).await {
        Ok(period) => {
            (StatusCode::OK, Json(ResolveResponse::new(query.date, period))).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::app;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn june(status: PeriodStatus) -> AccountingPeriod {
        AccountingPeriod {
            id: PeriodId::new(6),
            name: "June 2025".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            status,
        }
    }

    #[test]
    fn test_resolve_response_posting_allowed() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        assert!(ResolveResponse::new(date, Some(june(PeriodStatus::Open))).posting_allowed);
        assert!(!ResolveResponse::new(date, Some(june(PeriodStatus::Closed))).posting_allowed);
        assert!(!ResolveResponse::new(date, None).posting_allowed);
    }

    #[test]
    fn test_status_request_wire_format() {
        let request: UpdatePeriodStatusRequest =
            serde_json::from_str(r#"{"status": "closed"}"#).unwrap();
        assert_eq!(request.status, PeriodStatus::Closed);
        assert!(serde_json::from_str::<UpdatePeriodStatusRequest>(r#"{"status": "soft"}"#).is_err());
    }

    #[tokio::test]
    async fn test_unknown_status_rejected() {
        let response = app(routes())
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/accounting-periods/6/status")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"status": "frozen"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
