//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Session-token authentication middleware
//! - The HTTP-backed contractor directory client
//!
//! Typed service errors are translated to HTTP status plus a structured
//! `{"error": CODE, "message": "..."}` body at this boundary; the
//! frontend branches on the code, never on the message.

pub mod clients;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use fisca_core::directory::Directory;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Contractor directory (mock or HTTP, fixed at startup).
    pub directory: Arc<dyn Directory>,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Account code credited by every journal posting.
    pub bank_account_code: String,
    /// Display name for the bank account.
    pub bank_account_name: String,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
