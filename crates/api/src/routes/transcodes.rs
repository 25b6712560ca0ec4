//! Transcode (document type) routes and document number allocation.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::error_response;
use crate::AppState;
use arus_core::sequence::{TranscodeCategory, TranscodeDefinition};
use arus_db::{SequenceRepository, entities::transcodes};

/// Creates the transcode routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transcodes", get(list_transcodes).post(create_transcode))
        .route("/transcodes/{code}/preview", get(preview_number))
        .route("/transcodes/{code}/generate", get(generate_number))
}

/// Query parameters for listing transcodes.
#[derive(Debug, Default, Deserialize)]
pub struct ListTranscodesQuery {
    /// Restrict to one category number.
    pub nomortranscode: Option<i32>,
    /// `true` for cash and bank transcodes only, `false` to exclude them.
    pub treasury: Option<bool>,
}

impl ListTranscodesQuery {
    fn matches(&self, category: TranscodeCategory) -> bool {
        self.treasury.is_none_or(|treasury| category.is_treasury() == treasury)
    }
}

/// Response for a transcode.
#[derive(Debug, Serialize)]
pub struct TranscodeResponse {
    /// Transcode ID.
    pub id: i64,
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Prefix substituted for `{PREFIX}`.
    pub prefix: String,
    /// Format template.
    pub format: String,
    /// Category number.
    pub nomortranscode: i32,
    /// Category derived from the number.
    pub category: TranscodeCategory,
    /// Last allocated counter value.
    pub last_number: i64,
    /// Whether numbers may be allocated.
    pub is_active: bool,
}

impl From<transcodes::Model> for TranscodeResponse {
    fn from(model: transcodes::Model) -> Self {
        Self {
            id: model.id,
            category: TranscodeCategory::from_number(model.nomortranscode),
            code: model.code,
            name: model.name,
            prefix: model.prefix,
            format: model.format,
            nomortranscode: model.nomortranscode,
            last_number: model.last_number,
            is_active: model.is_active,
        }
    }
}

/// GET `/transcodes` - List transcodes, optionally by category or treasury kind.
async fn list_transcodes(
    State(state): State<AppState>,
    Query(query): Query<ListTranscodesQuery>,
) -> impl IntoResponse {
    let repo = SequenceRepository::new((*state.db).clone(), state.sequence);

    match repo.list(query.nomortranscode).await {
        Ok(rows) => {
            let transcodes: Vec<TranscodeResponse> = rows
                .into_iter()
                .map(TranscodeResponse::from)
                .filter(|t| query.matches(t.category))
                .collect();
            (StatusCode::OK, Json(json!({ "transcodes": transcodes }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// POST `/transcodes` - Create a transcode after validating its template.
async fn create_transcode(
    State(state): State<AppState>,
    Json(payload): Json<TranscodeDefinition>,
) -> impl IntoResponse {
    let repo = SequenceRepository::new((*state.db).clone(), state.sequence);

    match repo.create(payload).await {
        Ok(model) => {
            info!(transcode_id = model.id, code = %model.code, "Transcode created");
            (StatusCode::CREATED, Json(TranscodeResponse::from(model))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET `/transcodes/{code}/preview` - Next number without consuming it.
async fn preview_number(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let repo = SequenceRepository::new((*state.db).clone(), state.sequence);

    match repo.preview(&code, state.clock.today()).await {
        Ok(doc_number) => (
            StatusCode::OK,
            Json(json!({ "code": code, "doc_number": doc_number })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/transcodes/{code}/generate` - Allocate the next document number.
async fn generate_number(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let repo = SequenceRepository::new((*state.db).clone(), state.sequence);

    match repo.allocate_next(&code, state.clock.today()).await {
        Ok(allocation) => {
            info!(
                code = %code,
                value = allocation.value,
                doc_number = %allocation.doc_number,
                "Document number generated"
            );
            (
                StatusCode::OK,
                Json(json!({ "doc_number": allocation.doc_number })),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}
