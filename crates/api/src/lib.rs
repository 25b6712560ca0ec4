//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for transcodes, journals, rates and accounting periods
//! - Mapping of domain errors onto `{error, message}` JSON responses

pub mod routes;

use arus_db::SequenceSettings;
use arus_shared::BusinessClock;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Business calendar used to date allocated document numbers.
    pub clock: BusinessClock,
    /// Retry and lock settings for sequence allocation.
    pub sequence: SequenceSettings,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
