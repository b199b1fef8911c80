//! Contract repository.
//!
//! `create_draft` reserves the full contract amount in the same database
//! transaction as the contract insert: if funds are unavailable the
//! contract never exists. Approval transitions leave the reservation
//! untouched; rejection releases whatever has not been paid out yet.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use fisca_core::contract::{ContractError, ContractService, ContractStatus};
use fisca_shared::types::PageRequest;

use crate::entities::contracts;
use crate::repositories::budget::BudgetRepository;

/// Input for drafting a contract.
#[derive(Debug, Clone)]
pub struct CreateContractInput {
    /// Unique contract number.
    pub contract_number: String,
    /// Short title.
    pub title: String,
    /// Total contract value; blocked in full at draft time.
    pub total_amount: Decimal,
    /// Budget row the contract draws from.
    pub budget_row_id: Uuid,
    /// Contractor registry code (eligibility checked upstream against
    /// the directory).
    pub contractor_code: String,
    /// Drafting user.
    pub created_by: Uuid,
}

fn db_err(e: DbErr) -> ContractError {
    ContractError::Database(e.to_string())
}

pub(crate) fn parse_contract_status(raw: &str) -> Result<ContractStatus, ContractError> {
    ContractStatus::parse(raw)
        .ok_or_else(|| ContractError::Database(format!("corrupt contract status: {raw}")))
}

/// Contract repository.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    db: DatabaseConnection,
}

impl ContractRepository {
    /// Creates a new contract repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Drafts a contract, blocking its full amount atomically.
    ///
    /// # Errors
    ///
    /// - `ContractError::NonPositiveAmount` for a non-positive total.
    /// - `ContractError::DuplicateNumber` when the number is taken.
    /// - `ContractError::Ledger(InsufficientFunds)` when the budget row
    ///   cannot cover the total; nothing is persisted.
    pub async fn create_draft(
        &self,
        input: CreateContractInput,
    ) -> Result<contracts::Model, ContractError> {
        ContractService::validate_draft(input.total_amount)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = contracts::Entity::find()
            .filter(contracts::Column::ContractNumber.eq(&input.contract_number))
            .one(&txn)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(ContractError::DuplicateNumber(input.contract_number));
        }

        BudgetRepository::block_funds_in_txn(
            &txn,
            input.budget_row_id,
            input.total_amount,
            input.created_by,
            &input.contract_number,
        )
        .await?;

        let now = Utc::now().into();
        let model = contracts::ActiveModel {
            id: Set(Uuid::new_v4()),
            contract_number: Set(input.contract_number),
            title: Set(input.title),
            status: Set(ContractStatus::Draft.as_str().to_string()),
            total_amount: Set(input.total_amount),
            paid_amount: Set(Decimal::ZERO),
            budget_row_id: Set(input.budget_row_id),
            contractor_code: Set(input.contractor_code),
            version: Set(0),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            contract_id = %inserted.id,
            contract_number = %inserted.contract_number,
            total = %inserted.total_amount,
            "contract drafted, funds reserved"
        );

        Ok(inserted)
    }

    /// Submits a draft for approval. No ledger change.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` outside `Draft`.
    pub async fn submit(&self, id: Uuid) -> Result<contracts::Model, ContractError> {
        self.transition(id, ContractService::submit).await
    }

    /// Approves a submitted contract. Money stays reserved through
    /// execution; only statement payments convert it to spend.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` outside
    /// `PendingApproval`.
    pub async fn approve(&self, id: Uuid) -> Result<contracts::Model, ContractError> {
        self.transition(id, ContractService::approve).await
    }

    /// Rejects a contract and releases the still-unspent reservation.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` outside `Draft` /
    /// `PendingApproval`.
    pub async fn reject(
        &self,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<contracts::Model, ContractError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let contract = contracts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(ContractError::NotFound(id))?;

        let current = parse_contract_status(&contract.status)?;
        let new_status = ContractService::reject(current)?;

        let unspent = contract.total_amount - contract.paid_amount;
        if unspent > Decimal::ZERO {
            BudgetRepository::release_funds_in_txn(
                &txn,
                contract.budget_row_id,
                unspent,
                actor_id,
                &contract.contract_number,
            )
            .await?;
        }

        let now = Utc::now().into();
        let version = contract.version;
        let mut active: contracts::ActiveModel = contract.into();
        active.status = Set(new_status.as_str().to_string());
        active.version = Set(version + 1);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Gets a contract by ID.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::NotFound` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<contracts::Model, ContractError> {
        contracts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ContractError::NotFound(id))
    }

    /// Lists contracts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<Vec<contracts::Model>, ContractError> {
        contracts::Entity::find()
            .order_by_desc(contracts::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.limit()))
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Applies a pure status transition under the row lock.
    async fn transition(
        &self,
        id: Uuid,
        step: fn(ContractStatus) -> Result<ContractStatus, ContractError>,
    ) -> Result<contracts::Model, ContractError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let contract = contracts::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(ContractError::NotFound(id))?;

        let current = parse_contract_status(&contract.status)?;
        let new_status = step(current)?;

        let now = Utc::now().into();
        let version = contract.version;
        let mut active: contracts::ActiveModel = contract.into();
        active.status = Set(new_status.as_str().to_string());
        active.version = Set(version + 1);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }
}
