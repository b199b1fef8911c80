//! Budget row routes: balance views and the audit trail. Read-only —
//! the ledger is mutated only through transactions, contracts, and
//! statement payments.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use fisca_db::BudgetRepository;
use fisca_db::entities::{budget_rows, budget_transactions};
use fisca_db::repositories::budget::row_balances;
use fisca_shared::types::PageRequest;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::service_error;

/// Creates the budget row routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budget-rows", get(list_rows))
        .route("/budget-rows/{id}", get(get_row))
        .route("/budget-rows/{id}/history", get(get_history))
}

/// Query parameters for listing budget rows.
#[derive(Debug, Deserialize)]
pub struct ListRowsQuery {
    /// Filter by fiscal year.
    pub fiscal_year: Option<i16>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListRowsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Response for a budget row with its derived remaining balance.
#[derive(Debug, Serialize)]
pub struct BudgetRowResponse {
    /// Row ID.
    pub id: Uuid,
    /// Owning activity.
    pub activity_id: Uuid,
    /// Owning org unit; null means globally visible.
    pub org_unit_id: Option<Uuid>,
    /// Unique budget coding.
    pub budget_coding: String,
    /// Approved amount.
    pub approved_amount: String,
    /// Blocked amount.
    pub blocked_amount: String,
    /// Spent amount.
    pub spent_amount: String,
    /// Derived: approved - blocked - spent.
    pub remaining_balance: String,
    /// Fiscal year.
    pub fiscal_year: i16,
}

impl From<budget_rows::Model> for BudgetRowResponse {
    fn from(row: budget_rows::Model) -> Self {
        let remaining = row_balances(&row).remaining();
        Self {
            id: row.id,
            activity_id: row.activity_id,
            org_unit_id: row.org_unit_id,
            budget_coding: row.budget_coding,
            approved_amount: row.approved_amount.to_string(),
            blocked_amount: row.blocked_amount.to_string(),
            spent_amount: row.spent_amount.to_string(),
            remaining_balance: remaining.to_string(),
            fiscal_year: row.fiscal_year,
        }
    }
}

/// Response for one audit trail entry.
#[derive(Debug, Serialize)]
pub struct LedgerHistoryEntry {
    /// Entry ID.
    pub id: Uuid,
    /// BLOCK | RELEASE | CONFIRM.
    pub operation: String,
    /// Mutation amount.
    pub amount: String,
    /// Acting user.
    pub user_id: Uuid,
    /// Document that caused the mutation.
    pub reference_doc: String,
    /// Blocked amount before.
    pub pre_blocked: String,
    /// Spent amount before.
    pub pre_spent: String,
    /// Blocked amount after.
    pub post_blocked: String,
    /// Spent amount after.
    pub post_spent: String,
    /// Timestamp.
    pub created_at: String,
}

impl From<budget_transactions::Model> for LedgerHistoryEntry {
    fn from(entry: budget_transactions::Model) -> Self {
        Self {
            id: entry.id,
            operation: entry.operation,
            amount: entry.amount.to_string(),
            user_id: entry.user_id,
            reference_doc: entry.reference_doc,
            pre_blocked: entry.pre_blocked.to_string(),
            pre_spent: entry.pre_spent.to_string(),
            post_blocked: entry.post_blocked.to_string(),
            post_spent: entry.post_spent.to_string(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// GET `/budget-rows` - list rows with balances.
async fn list_rows(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListRowsQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.list_rows(query.fiscal_year, &query.page_request()).await {
        Ok(rows) => {
            let rows: Vec<BudgetRowResponse> =
                rows.into_iter().map(BudgetRowResponse::from).collect();
            (StatusCode::OK, Json(json!({ "budget_rows": rows }))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/budget-rows/{id}` - one row with its derived balance.
async fn get_row(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.get_row(id).await {
        Ok(row) => (StatusCode::OK, Json(BudgetRowResponse::from(row))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/budget-rows/{id}/history` - the append-only audit trail.
async fn get_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());

    // 404 for unknown rows, not an empty list.
    if let Err(e) = repo.get_row(id).await {
        return service_error(e.status_code(), e.error_code(), e);
    }

    match repo.history(id).await {
        Ok(entries) => {
            let entries: Vec<LedgerHistoryEntry> =
                entries.into_iter().map(LedgerHistoryEntry::from).collect();
            (StatusCode::OK, Json(json!({ "history": entries }))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}
