//! Fisca API Server
//!
//! Main entry point for the Fisca backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fisca_api::{AppState, clients::build_directory, create_router};
use fisca_db::connect;
use fisca_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fisca=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Contractor directory is fixed here, once, from configuration.
    let directory = build_directory(&config.directory)
        .map_err(|e| anyhow::anyhow!("directory configuration error: {e}"))?;
    info!(mode = ?config.directory.mode, "Contractor directory configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        directory,
        session_ttl_secs: config.session.ttl_secs,
        bank_account_code: config.accounting.bank_account_code.clone(),
        bank_account_name: config.accounting.bank_account_name.clone(),
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
