//! Contract routes, including statement creation under a contract.

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
use tracing::error;
use uuid::Uuid;

use fisca_db::entities::contracts;
use fisca_db::repositories::contract::{ContractRepository, CreateContractInput};
use fisca_db::repositories::statement::{CreateStatementInput, StatementRepository};
use fisca_shared::types::PageRequest;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::service_error;
use crate::routes::statements::StatementResponse;

/// Creates the contract routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contracts", get(list_contracts))
        .route("/contracts", post(create_contract))
        .route("/contracts/{id}", get(get_contract))
        .route("/contracts/{id}/submit", post(submit_contract))
        .route("/contracts/{id}/approve", post(approve_contract))
        .route("/contracts/{id}/reject", post(reject_contract))
        .route("/contracts/{id}/statements", get(list_statements))
        .route("/contracts/{id}/statements", post(create_statement))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for drafting a contract.
#[derive(Debug, Deserialize)]
pub struct CreateContractRequest {
    /// Unique contract number.
    pub contract_number: String,
    /// Short title.
    pub title: String,
    /// Total value, as a decimal string; blocked in full at draft time.
    pub total_amount: String,
    /// Budget row to draw from.
    pub budget_row_id: Uuid,
    /// Contractor registry code; checked against the directory.
    pub contractor_code: String,
}

/// Request body for creating a progress statement.
#[derive(Debug, Deserialize)]
pub struct CreateStatementRequest {
    /// Gross claim, as a decimal string.
    pub gross_amount: String,
    /// Deductions, as a decimal string. Defaults to zero.
    pub deductions: Option<String>,
}

/// Query parameters for listing contracts.
#[derive(Debug, Deserialize)]
pub struct ListContractsQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ListContractsQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Response for a contract.
#[derive(Debug, Serialize)]
pub struct ContractResponse {
    /// Contract ID.
    pub id: Uuid,
    /// Contract number.
    pub contract_number: String,
    /// Short title.
    pub title: String,
    /// Lifecycle status.
    pub status: String,
    /// Total value.
    pub total_amount: String,
    /// Paid so far.
    pub paid_amount: String,
    /// Budget row.
    pub budget_row_id: Uuid,
    /// Contractor registry code.
    pub contractor_code: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<contracts::Model> for ContractResponse {
    fn from(contract: contracts::Model) -> Self {
        Self {
            id: contract.id,
            contract_number: contract.contract_number,
            title: contract.title,
            status: contract.status,
            total_amount: contract.total_amount.to_string(),
            paid_amount: contract.paid_amount.to_string(),
            budget_row_id: contract.budget_row_id,
            contractor_code: contract.contractor_code,
            created_at: contract.created_at.to_rfc3339(),
        }
    }
}

fn invalid_amount() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "INVALID_AMOUNT",
            "message": "Amount must be a decimal string"
        })),
    )
        .into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/contracts` - draft a contract, blocking its total atomically.
/// The contractor must be registered and eligible in the directory.
async fn create_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateContractRequest>,
) -> impl IntoResponse {
    let Ok(total_amount) = Decimal::from_str(&payload.total_amount) else {
        return invalid_amount();
    };

    // Eligibility gate before any money moves.
    match state.directory.contractor(&payload.contractor_code).await {
        Ok(Some(info)) if info.is_eligible() => {}
        Ok(_) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "CONTRACTOR_NOT_ELIGIBLE",
                    "message": format!(
                        "Contractor {} is not registered or not eligible",
                        payload.contractor_code
                    )
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "contractor directory lookup failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "DIRECTORY_UNAVAILABLE",
                    "message": "Contractor directory is unavailable"
                })),
            )
                .into_response();
        }
    }

    let repo = ContractRepository::new((*state.db).clone());
    let input = CreateContractInput {
        contract_number: payload.contract_number,
        title: payload.title,
        total_amount,
        budget_row_id: payload.budget_row_id,
        contractor_code: payload.contractor_code,
        created_by: auth.user_id(),
    };

    match repo.create_draft(input).await {
        Ok(contract) => {
            (StatusCode::CREATED, Json(ContractResponse::from(contract))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/contracts` - list contracts.
async fn list_contracts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListContractsQuery>,
) -> impl IntoResponse {
    let repo = ContractRepository::new((*state.db).clone());
    match repo.list(&query.page_request()).await {
        Ok(list) => {
            let list: Vec<ContractResponse> =
                list.into_iter().map(ContractResponse::from).collect();
            (StatusCode::OK, Json(json!({ "contracts": list }))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/contracts/{id}` - one contract.
async fn get_contract(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ContractRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(contract) => (StatusCode::OK, Json(ContractResponse::from(contract))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/contracts/{id}/submit`.
async fn submit_contract(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ContractRepository::new((*state.db).clone());
    match repo.submit(id).await {
        Ok(contract) => (StatusCode::OK, Json(ContractResponse::from(contract))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/contracts/{id}/approve` - money stays reserved; only
/// statement payments convert it to spend.
async fn approve_contract(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ContractRepository::new((*state.db).clone());
    match repo.approve(id).await {
        Ok(contract) => (StatusCode::OK, Json(ContractResponse::from(contract))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/contracts/{id}/reject` - releases the unspent reservation.
async fn reject_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ContractRepository::new((*state.db).clone());
    match repo.reject(id, auth.user_id()).await {
        Ok(contract) => (StatusCode::OK, Json(ContractResponse::from(contract))).into_response(),
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// POST `/contracts/{id}/statements` - create a statement. 422
/// OVER_PAYMENT when cumulative net would exceed the contract total.
async fn create_statement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateStatementRequest>,
) -> impl IntoResponse {
    let Ok(gross_amount) = Decimal::from_str(&payload.gross_amount) else {
        return invalid_amount();
    };
    let deductions = match payload.deductions.as_deref() {
        None => Decimal::ZERO,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(value) => value,
            Err(_) => return invalid_amount(),
        },
    };

    let repo = StatementRepository::new((*state.db).clone());
    let input = CreateStatementInput {
        contract_id: id,
        gross_amount,
        deductions,
        created_by: auth.user_id(),
    };

    match repo.create(input).await {
        Ok(statement) => {
            (StatusCode::CREATED, Json(StatementResponse::from(statement))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}

/// GET `/contracts/{id}/statements` - the contract's statements in
/// sequence order.
async fn list_statements(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = StatementRepository::new((*state.db).clone());
    match repo.list_for_contract(id).await {
        Ok(list) => {
            let list: Vec<StatementResponse> =
                list.into_iter().map(StatementResponse::from).collect();
            (StatusCode::OK, Json(json!({ "statements": list }))).into_response()
        }
        Err(e) => service_error(e.status_code(), e.error_code(), e),
    }
}
