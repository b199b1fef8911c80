//! Accounting routes: journal preview and exactly-once posting.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use fisca_db::repositories::accounting::{AccountingRepository, JournalPreview};

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::service_error;

/// Creates the accounting routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounting/tx/{id}/journal-preview", get(journal_preview))
        .route("/accounting/tx/{id}/post", post(post_transaction))
}

/// Request body for posting.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    /// Treasury posting reference; posting is idempotent per reference.
    pub posting_ref: String,
    /// The transaction version the caller last saw.
    pub version: i32,
    /// Optional notes stored on the transaction.
    pub notes: Option<String>,
}

/// Response for a journal snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    /// Snapshot ID.
    pub id: Uuid,
    /// Source transaction.
    pub transaction_id: Uuid,
    /// Sum of debit lines.
    pub total_debit: String,
    /// Sum of credit lines.
    pub total_credit: String,
    /// Whether debits equal credits.
    pub is_balanced: bool,
    /// VALID | WARNING | BLOCKED.
    pub validation_status: String,
    /// Tamper-evidence hash of the line set.
    pub content_hash: String,
    /// When the snapshot was frozen.
    pub created_at: String,
    /// The frozen lines.
    pub lines: Vec<LineResponse>,
}

/// Response for one journal line.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    /// 1-based position.
    pub line_no: i16,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// DEBIT | CREDIT.
    pub side: String,
    /// Line amount.
    pub amount: String,
}

impl From<JournalPreview> for SnapshotResponse {
    fn from(preview: JournalPreview) -> Self {
        Self {
            id: preview.snapshot.id,
            transaction_id: preview.snapshot.transaction_id,
            total_debit: preview.snapshot.total_debit.to_string(),
            total_credit: preview.snapshot.total_credit.to_string(),
            is_balanced: preview.snapshot.is_balanced,
            validation_status: preview.snapshot.validation_status,
            content_hash: preview.snapshot.content_hash,
            created_at: preview.snapshot.created_at.to_rfc3339(),
            lines: preview
                .lines
                .into_iter()
                .map(|line| LineResponse {
                    line_no: line.line_no,
                    account_code: line.account_code,
                    account_name: line.account_name,
                    side: line.side,
                    amount: line.amount.to_string(),
                })
                .collect(),
        }
    }
}

fn accounting_repo(state: &AppState) -> AccountingRepository {
    AccountingRepository::new(
        (*state.db).clone(),
        state.bank_account_code.clone(),
        state.bank_account_name.clone(),
    )
}

/// GET `/accounting/tx/{id}/journal-preview` - the frozen snapshot,
/// created lazily on first call and returned unchanged afterwards.
async fn journal_preview(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = accounting_repo(&state);
    match repo.journal_preview(id, auth.user_id()).await {
        Ok(preview) => {
            (StatusCode::OK, Json(SnapshotResponse::from(preview))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/accounting/tx/{id}/post` - exactly-once posting. 200 on
/// success or idempotent replay; 409 CONFLICT / VERSION_MISMATCH; 400
/// INVALID_STATE; 404 unknown transaction.
async fn post_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostRequest>,
) -> impl IntoResponse {
    if payload.posting_ref.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "INVALID_POSTING_REF",
                "message": "posting_ref is required"
            })),
        )
            .into_response();
    }

    let repo = accounting_repo(&state);
    match repo
        .post(
            id,
            &payload.posting_ref,
            payload.version,
            payload.notes,
            auth.user_id(),
        )
        .await
    {
        Ok(receipt) => (
            StatusCode::OK,
            Json(json!({
                "transaction_id": receipt.transaction_id,
                "posting_ref": receipt.posting_ref,
                "posted_at": receipt.posted_at.to_rfc3339(),
                "version": receipt.version,
                "idempotent": receipt.idempotent,
            })),
        )
            .into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}
