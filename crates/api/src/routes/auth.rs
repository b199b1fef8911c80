//! Session routes: login and logout.
//!
//! Thin wrappers over the database-backed session store. Session-cookie
//! mechanics beyond bearer tokens (CSRF, rotation policies) live in the
//! frontend gateway and are out of scope here.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use fisca_db::{SessionRepository, UserRepository};

use crate::AppState;

/// Creates the unauthenticated auth routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Creates the authenticated auth routes.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(logout))
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

const INVALID_CREDENTIALS: (&str, &str) = ("INVALID_CREDENTIALS", "Invalid username or password");

/// POST `/auth/login` - exchange credentials for a session token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let users = UserRepository::new((*state.db).clone());

    let user = match users.find_by_username(&payload.username).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": INVALID_CREDENTIALS.0,
                    "message": INVALID_CREDENTIALS.1
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "login lookup failed");
            return internal_error();
        }
    };

    let verified = PasswordHash::new(&user.password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(payload.password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false);
    if !verified {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": INVALID_CREDENTIALS.0,
                "message": INVALID_CREDENTIALS.1
            })),
        )
            .into_response();
    }

    let sessions = SessionRepository::new((*state.db).clone());
    match sessions.create(user.id, state.session_ttl_secs).await {
        Ok(issued) => {
            info!(user_id = %user.id, "session issued");
            (
                StatusCode::OK,
                Json(json!({
                    "token": issued.token,
                    "expires_at": issued.session.expires_at.to_rfc3339(),
                    "user": {
                        "id": user.id,
                        "username": user.username,
                        "display_name": user.display_name,
                        "admin_level": user.admin_level,
                    }
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "session creation failed");
            internal_error()
        }
    }
}

/// POST `/auth/logout` - revoke the presented session token.
async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> impl IntoResponse {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")));

    let Some(token) = token else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "MISSING_TOKEN",
                "message": "No token to revoke"
            })),
        )
            .into_response();
    };

    let sessions = SessionRepository::new((*state.db).clone());
    match sessions.revoke(token).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "revoked": true }))).into_response(),
        Err(e) => {
            error!(error = %e, "session revocation failed");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "INTERNAL_ERROR",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
