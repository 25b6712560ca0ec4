//! Journal routes: create, edit, post, unpost, delete and queries.
//!
//! Every write runs as one database transaction inside `JournalRepository`;
//! handlers only translate between JSON and the repository.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::error_response;
use crate::AppState;
use arus_core::ledger::{JournalInput, JournalStatus};
use arus_db::{JournalRepository, repositories::JournalFilter};
use arus_shared::types::{JournalId, PageRequest, PageResponse};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journals", get(list_journals).post(create_journal))
        .route(
            "/journals/{id}",
            get(get_journal).put(update_journal).delete(delete_journal),
        )
        .route("/journals/{id}/post", put(post_journal))
        .route("/journals/{id}/unpost", put(unpost_journal))
}

/// Query parameters for listing journals.
#[derive(Debug, Default, Deserialize)]
pub struct ListJournalsQuery {
    /// `Draft` or `Posted`.
    pub status: Option<JournalStatus>,
    /// Transcode code, e.g. "JV".
    pub transcode: Option<String>,
    /// Transcode category number.
    pub nomortranscode: Option<i32>,
    /// Earliest doc date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Latest doc date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListJournalsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .normalized()
    }
}

fn repository(state: &AppState) -> JournalRepository {
    JournalRepository::new((*state.db).clone(), state.sequence)
}

/// POST `/journals` - Create a Draft journal.
async fn create_journal(
    State(state): State<AppState>,
    Json(payload): Json<JournalInput>,
) -> impl IntoResponse {
    let repo = repository(&state);

    match repo.create(payload, state.clock.today()).await {
        Ok(journal) => {
            info!(
                journal_id = %journal.id,
                doc_number = %journal.doc_number,
                "Journal created"
            );
            (StatusCode::CREATED, Json(journal)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/journals` - List journal headers, newest first.
async fn list_journals(
    State(state): State<AppState>,
    Query(query): Query<ListJournalsQuery>,
) -> impl IntoResponse {
    let repo = repository(&state);
    let page = query.page_request();
    let filter = JournalFilter {
        status: query.status,
        transcode_code: query.transcode,
        nomortranscode: query.nomortranscode,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    match repo.list(filter, &page).await {
        Ok((journals, total)) => (
            StatusCode::OK,
            Json(PageResponse::new(journals, page.page, page.per_page, total)),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/journals/{id}` - Journal with lines and totals.
async fn get_journal(
    State(state): State<AppState>,
    Path(id): Path<JournalId>,
) -> impl IntoResponse {
    match repository(&state).get(id).await {
        Ok(journal) => (StatusCode::OK, Json(journal)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT `/journals/{id}` - Replace header and lines of a Draft journal.
async fn update_journal(
    State(state): State<AppState>,
    Path(id): Path<JournalId>,
    Json(payload): Json<JournalInput>,
) -> impl IntoResponse {
    match repository(&state).update(id, payload).await {
        Ok(journal) => {
            info!(journal_id = %id, "Journal updated");
            (StatusCode::OK, Json(journal)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// PUT `/journals/{id}/post` - Post a Draft journal.
async fn post_journal(
    State(state): State<AppState>,
    Path(id): Path<JournalId>,
) -> impl IntoResponse {
    match repository(&state).post(id).await {
        Ok(journal) => {
            info!(journal_id = %id, doc_number = %journal.doc_number, "Journal posted");
            (StatusCode::OK, Json(journal)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// PUT `/journals/{id}/unpost` - Return a Posted journal to Draft.
async fn unpost_journal(
    State(state): State<AppState>,
    Path(id): Path<JournalId>,
) -> impl IntoResponse {
    match repository(&state).unpost(id).await {
        Ok(journal) => {
            info!(journal_id = %id, doc_number = %journal.doc_number, "Journal unposted");
            (StatusCode::OK, Json(journal)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// DELETE `/journals/{id}` - Delete a Draft journal.
async fn delete_journal(
    State(state): State<AppState>,
    Path(id): Path<JournalId>,
) -> impl IntoResponse {
    match repository(&state).delete(id).await {
        Ok(()) => {
            info!(journal_id = %id, "Journal deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(e),
    }
}
