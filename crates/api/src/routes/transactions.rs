//! Transaction routes: creation and the admin approval ladder.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use fisca_core::workflow::TransactionStatus;
use fisca_db::entities::transactions;
use fisca_db::repositories::transaction::{
    CodeCoordinates, CreateTransactionInput, TransactionRepository,
};
use fisca_db::WorkflowRepository;
use fisca_shared::types::PageRequest;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::service_error;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}/resubmit", post(resubmit_transaction))
        .route("/admin/transactions/{id}/approve", post(approve_transaction))
        .route("/admin/transactions/{id}/reject", post(reject_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Business-key coordinates supplied by the client; the server assigns
/// the date and occurrence segments.
#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    /// Municipal zone number.
    pub zone: u8,
    /// Department number.
    pub department: u8,
    /// Section number.
    pub section: u8,
    /// Budget coding (numeric part).
    pub budget: u32,
    /// Cost center.
    pub cost_center: u16,
    /// Continuous activity number.
    pub continuous_activity: u16,
    /// Special activity number.
    pub special_activity: u16,
    /// Beneficiary registry number.
    pub beneficiary: u32,
    /// Event number.
    pub event: u16,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Short title.
    pub title: String,
    /// Amount to reserve, as a decimal string.
    pub amount: String,
    /// Budget row to draw from.
    pub budget_row_id: Uuid,
    /// Optional beneficiary registry code.
    pub beneficiary_code: Option<String>,
    /// Business-key coordinates.
    pub code: CodeRequest,
}

/// Request body for rejecting a transaction.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Reason shown to the requester; required.
    pub reason: String,
    /// When true the transaction returns to `draft` instead of the
    /// terminal `rejected`.
    #[serde(default)]
    pub return_to_user: bool,
}

/// Request body for approving a transaction.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Optional note for the workflow log.
    pub comment: Option<String>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by workflow status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListTransactionsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// 11-part business key.
    pub unique_code: String,
    /// Short title.
    pub title: String,
    /// Workflow status.
    pub status: String,
    /// Amount.
    pub amount: String,
    /// Budget row.
    pub budget_row_id: Uuid,
    /// Beneficiary code.
    pub beneficiary_code: Option<String>,
    /// Optimistic lock version; echo it back when posting.
    pub version: i32,
    /// Accounting status.
    pub accounting_status: Option<String>,
    /// Posting reference.
    pub posting_ref: Option<String>,
    /// When it was posted.
    pub posted_at: Option<String>,
    /// Creator.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(tx: transactions::Model) -> Self {
        Self {
            id: tx.id,
            unique_code: tx.unique_code,
            title: tx.title,
            status: tx.status,
            amount: tx.amount.to_string(),
            budget_row_id: tx.budget_row_id,
            beneficiary_code: tx.beneficiary_code,
            version: tx.version,
            accounting_status: tx.accounting_status,
            posting_ref: tx.posting_ref,
            posted_at: tx.posted_at.map(|t| t.to_rfc3339()),
            created_by: tx.created_by,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transactions` - create a transaction at `pending_l1` with its
/// amount reserved. 422 when the budget row cannot cover it.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "INVALID_AMOUNT",
                "message": "Amount must be a decimal string"
            })),
        )
            .into_response();
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let input = CreateTransactionInput {
        title: payload.title,
        amount,
        budget_row_id: payload.budget_row_id,
        beneficiary_code: payload.beneficiary_code,
        code: CodeCoordinates {
            zone: payload.code.zone,
            department: payload.code.department,
            section: payload.code.section,
            budget: payload.code.budget,
            cost_center: payload.code.cost_center,
            continuous_activity: payload.code.continuous_activity,
            special_activity: payload.code.special_activity,
            beneficiary: payload.code.beneficiary,
            event: payload.code.event,
        },
        created_by: auth.user_id(),
    };

    match repo.create(input).await {
        Ok(tx) => {
            (StatusCode::CREATED, Json(TransactionResponse::from(tx))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/transactions` - list with optional status filter.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match TransactionStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "INVALID_STATUS",
                        "message": format!("Unknown status filter: {raw}")
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.list(status, &query.page_request()).await {
        Ok(txs) => {
            let txs: Vec<TransactionResponse> =
                txs.into_iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(json!({ "transactions": txs }))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/transactions/{id}` - one transaction with its workflow log.
async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    let tx = match repo.get(id).await {
        Ok(tx) => tx,
        Err(e) => return service_error(e.status_code(), e.error_code(), e),
    };

    match repo.workflow_log(id).await {
        Ok(log) => {
            let log: Vec<serde_json::Value> = log
                .into_iter()
                .map(|entry| {
                    json!({
                        "previous_status": entry.previous_status,
                        "new_status": entry.new_status,
                        "action": entry.action,
                        "admin_level": entry.admin_level,
                        "actor_id": entry.actor_id,
                        "comment": entry.comment,
                        "created_at": entry.created_at.to_rfc3339(),
                    })
                })
                .collect();

            (
                StatusCode::OK,
                Json(json!({
                    "transaction": TransactionResponse::from(tx),
                    "workflow_log": log,
                })),
            )
                .into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/admin/transactions/{id}/approve` - advance one rung. 403 when
/// the caller's level does not match the waiting rung.
async fn approve_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> impl IntoResponse {
    let Some(level) = auth.admin_level() else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "NO_APPROVAL_AUTHORITY",
                "message": "Caller has no approval authority"
            })),
        )
            .into_response();
    };

    let repo = WorkflowRepository::new((*state.db).clone());

    match repo.approve(id, auth.user_id(), level, payload.comment).await {
        Ok(tx) => (StatusCode::OK, Json(TransactionResponse::from(tx))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/admin/transactions/{id}/reject` - reject terminally or return
/// to the requester; either way the reservation is released.
async fn reject_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let Some(level) = auth.admin_level() else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "NO_APPROVAL_AUTHORITY",
                "message": "Caller has no approval authority"
            })),
        )
            .into_response();
    };

    let repo = WorkflowRepository::new((*state.db).clone());
    match repo
        .reject(id, auth.user_id(), level, &payload.reason, payload.return_to_user)
        .await
    {
        Ok(tx) => (StatusCode::OK, Json(TransactionResponse::from(tx))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/transactions/{id}/resubmit` - put a returned draft back onto
/// the ladder, reserving its amount again.
async fn resubmit_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = WorkflowRepository::new((*state.db).clone());
    match repo.resubmit(id, auth.user_id()).await {
        Ok(tx) => (StatusCode::OK, Json(TransactionResponse::from(tx))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}
