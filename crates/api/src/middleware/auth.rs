//! Session-token authentication middleware.
//!
//! Every protected route receives a bearer token that the middleware
//! resolves against the database-backed session store. Handlers see the
//! result as a [`CurrentUser`]: a user id plus approval authority.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use fisca_core::workflow::AdminLevel;
use fisca_db::SessionRepository;

use crate::AppState;

/// The authenticated principal attached to the request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Raw approval authority column.
    pub admin_level: i16,
}

impl CurrentUser {
    /// The caller's approval authority, if any.
    #[must_use]
    pub fn admin_level(&self) -> Option<AdminLevel> {
        AdminLevel::from_i16(self.admin_level)
    }
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates session tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "MISSING_TOKEN",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    let sessions = SessionRepository::new((*state.db).clone());
    match sessions.resolve(token).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                username: user.username,
                admin_level: user.admin_level,
            });
            next.run(request).await
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "INVALID_SESSION",
                "message": "Session is unknown, expired, or revoked"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "session lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "INTERNAL_ERROR",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// Extractor for the authenticated user.
///
/// Use in handlers behind [`auth_middleware`]:
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let user_id = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl AuthUser {
    /// The authenticated user's ID.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.0.id
    }

    /// The caller's approval authority, if any.
    #[must_use]
    pub fn admin_level(&self) -> Option<AdminLevel> {
        self.0.admin_level()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().map_or_else(
            || {
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "MISSING_TOKEN",
                        "message": "Authentication is required"
                    })),
                )
                    .into_response())
            },
            |user| Ok(Self(user)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token(""), None);
    }

    #[test]
    fn test_current_user_admin_level() {
        let user = CurrentUser {
            id: Uuid::nil(),
            username: "u".to_string(),
            admin_level: 2,
        };
        assert_eq!(user.admin_level(), Some(AdminLevel::L2));

        let none = CurrentUser {
            id: Uuid::nil(),
            username: "u".to_string(),
            admin_level: 0,
        };
        assert_eq!(none.admin_level(), None);
    }
}
