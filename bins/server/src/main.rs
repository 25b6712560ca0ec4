//! Arus API Server
//!
//! Main entry point for the Arus accounting engine.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arus_api::{AppState, create_router};
use arus_db::{SequenceSettings, connect};
use arus_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arus=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    let clock = config.engine.clock()?;

    // Connect to database
    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let sequence = SequenceSettings::from(config.engine.sequence);
    info!(
        timezone = %clock.timezone(),
        today = %clock.today(),
        max_retries = sequence.max_retries,
        lock_timeout_ms = sequence.lock_timeout_ms,
        "Accounting engine configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        clock,
        sequence,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
