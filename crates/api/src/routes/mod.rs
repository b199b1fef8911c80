//! REST API routes.

pub mod accounting;
pub mod auth;
pub mod budget_rows;
pub mod contracts;
pub mod health;
pub mod statements;
pub mod transactions;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth_middleware};

/// Builds the `/api/v1` route tree. Everything except health and login
/// sits behind the session middleware.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(budget_rows::routes())
        .merge(transactions::routes())
        .merge(contracts::routes())
        .merge(statements::routes())
        .merge(accounting::routes())
        .merge(auth::protected_routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected)
}

/// Renders a typed service error as HTTP status plus the structured
/// error body the frontend branches on.
pub(crate) fn service_error(
    status: u16,
    code: &str,
    message: impl std::fmt::Display,
) -> Response {
    let status =
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message.to_string(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_falls_back_to_500() {
        let response = service_error(42, "BROKEN", "whatever");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_service_error_preserves_status() {
        let response = service_error(422, "OVER_PAYMENT", "too much");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
