//! Progress statement lifecycle routes.
//!
//! `pay` is the only route here that touches the ledger; it can 409
//! (invalid transition) or 422 (ledger refused the confirm).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use fisca_db::StatementRepository;
use fisca_db::entities::progress_statements;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::service_error;

/// Creates the statement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statements/{id}", get(get_statement))
        .route("/statements/{id}/submit", put(submit_statement))
        .route("/statements/{id}/approve", put(approve_statement))
        .route("/statements/{id}/pay", put(pay_statement))
}

/// Response for a progress statement.
#[derive(Debug, Serialize)]
pub struct StatementResponse {
    /// Statement ID.
    pub id: Uuid,
    /// Owning contract.
    pub contract_id: Uuid,
    /// 1-based position within the contract.
    pub sequence_no: i32,
    /// Gross claim.
    pub gross_amount: String,
    /// Deductions.
    pub deductions: String,
    /// Net payable.
    pub net_amount: String,
    /// Running net total across the contract.
    pub cumulative_amount: String,
    /// Lifecycle status.
    pub status: String,
    /// When it was paid.
    pub paid_at: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<progress_statements::Model> for StatementResponse {
    fn from(statement: progress_statements::Model) -> Self {
        Self {
            id: statement.id,
            contract_id: statement.contract_id,
            sequence_no: statement.sequence_no,
            gross_amount: statement.gross_amount.to_string(),
            deductions: statement.deductions.to_string(),
            net_amount: statement.net_amount.to_string(),
            cumulative_amount: statement.cumulative_amount.to_string(),
            status: statement.status,
            paid_at: statement.paid_at.map(|t| t.to_rfc3339()),
            created_at: statement.created_at.to_rfc3339(),
        }
    }
}

/// GET `/statements/{id}` - one statement.
async fn get_statement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = StatementRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(statement) => {
            (StatusCode::OK, Json(StatementResponse::from(statement))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// PUT `/statements/{id}/submit`.
async fn submit_statement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = StatementRepository::new((*state.db).clone());
    match repo.submit(id).await {
        Ok(statement) => {
            (StatusCode::OK, Json(StatementResponse::from(statement))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// PUT `/statements/{id}/approve`.
async fn approve_statement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = StatementRepository::new((*state.db).clone());
    match repo.approve(id).await {
        Ok(statement) => {
            (StatusCode::OK, Json(StatementResponse::from(statement))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// PUT `/statements/{id}/pay` - converts a slice of the contract's
/// reservation into permanent spend.
async fn pay_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = StatementRepository::new((*state.db).clone());
    match repo.pay(id, auth.user_id()).await {
        Ok(statement) => (
            StatusCode::OK,
            Json(json!({
                "statement": StatementResponse::from(statement),
                "paid": true,
            })),
        )
            .into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}
