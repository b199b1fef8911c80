//! Progress statement repository.
//!
//! The over-payment ceiling is a read-modify-write across a contract's
//! statements, so creation and payment both lock the contract row
//! first. Payment is the only transition that touches the ledger: it
//! confirms a slice of the contract's reservation as spend through the
//! budget service.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use fisca_core::contract::{ContractError, ContractService};
use fisca_core::statement::{StatementError, StatementService, StatementStatus};

use crate::entities::{contracts, progress_statements};
use crate::repositories::budget::BudgetRepository;
use crate::repositories::contract::parse_contract_status;

fn db_err(e: DbErr) -> StatementError {
    StatementError::Database(e.to_string())
}

fn parse_statement_status(raw: &str) -> Result<StatementStatus, StatementError> {
    StatementStatus::parse(raw)
        .ok_or_else(|| StatementError::Database(format!("corrupt statement status: {raw}")))
}

/// Input for creating a statement.
#[derive(Debug, Clone)]
pub struct CreateStatementInput {
    /// Owning contract.
    pub contract_id: Uuid,
    /// Gross claim.
    pub gross_amount: Decimal,
    /// Deductions withheld.
    pub deductions: Decimal,
    /// Claiming user.
    pub created_by: Uuid,
}

/// Progress statement repository.
#[derive(Debug, Clone)]
pub struct StatementRepository {
    db: DatabaseConnection,
}

impl StatementRepository {
    /// Creates a new statement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a statement after enforcing the contract ceiling under
    /// the contract row lock.
    ///
    /// # Errors
    ///
    /// - `StatementError::OverPayment` when cumulative net would exceed
    ///   the contract total; nothing is persisted.
    /// - `StatementError::InvalidAmounts` for malformed figures.
    pub async fn create(
        &self,
        input: CreateStatementInput,
    ) -> Result<progress_statements::Model, StatementError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Ceiling arithmetic is serialized by this lock.
        let contract = contracts::Entity::find_by_id(input.contract_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(StatementError::Contract(ContractError::NotFound(
                input.contract_id,
            )))?;

        let contract_status = parse_contract_status(&contract.status)?;
        if !contract_status.is_payable() {
            return Err(StatementError::Contract(ContractError::InvalidTransition {
                from: contract_status,
                action: "claim progress against",
            }));
        }

        let amounts = StatementService::amounts(input.gross_amount, input.deductions)?;

        let prior = Self::cumulative_net(&txn, input.contract_id).await?;
        let cumulative =
            StatementService::check_ceiling(prior, amounts.net, contract.total_amount)?;

        let sequence_no = i32::try_from(
            progress_statements::Entity::find()
                .filter(progress_statements::Column::ContractId.eq(input.contract_id))
                .all(&txn)
                .await
                .map_err(db_err)?
                .len(),
        )
        .map_err(|_| StatementError::Database("statement count overflow".to_string()))?
            + 1;

        let now = Utc::now().into();
        let model = progress_statements::ActiveModel {
            id: Set(Uuid::new_v4()),
            contract_id: Set(input.contract_id),
            sequence_no: Set(sequence_no),
            gross_amount: Set(amounts.gross),
            deductions: Set(amounts.deductions),
            net_amount: Set(amounts.net),
            cumulative_amount: Set(cumulative),
            status: Set(StatementStatus::Draft.as_str().to_string()),
            created_by: Set(input.created_by),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(inserted)
    }

    /// Submits a draft statement.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidTransition` outside `Draft`.
    pub async fn submit(&self, id: Uuid) -> Result<progress_statements::Model, StatementError> {
        self.transition(id, StatementService::submit).await
    }

    /// Approves a submitted statement.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidTransition` outside `Submitted`.
    pub async fn approve(&self, id: Uuid) -> Result<progress_statements::Model, StatementError> {
        self.transition(id, StatementService::approve).await
    }

    /// Pays an approved statement: converts its net amount from the
    /// contract's reservation into spend, accumulates
    /// `contract.paid_amount`, and advances the contract status.
    ///
    /// # Errors
    ///
    /// - `StatementError::InvalidTransition` outside `Approved`.
    /// - `StatementError::Contract(InvalidTransition)` when the contract
    ///   is not payable.
    /// - `StatementError::Ledger` when the ledger refuses the confirm.
    pub async fn pay(
        &self,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<progress_statements::Model, StatementError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let statement = progress_statements::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(StatementError::NotFound(id))?;

        let contract = contracts::Entity::find_by_id(statement.contract_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(StatementError::Contract(ContractError::NotFound(
                statement.contract_id,
            )))?;

        let statement_status = parse_statement_status(&statement.status)?;
        let new_statement_status = StatementService::pay(statement_status)?;

        let contract_status = parse_contract_status(&contract.status)?;
        let paid_after = contract.paid_amount + statement.net_amount;
        let new_contract_status =
            ContractService::after_payment(contract_status, paid_after, contract.total_amount)
                .map_err(StatementError::Contract)?;

        let reference = format!(
            "{}#{}",
            contract.contract_number, statement.sequence_no
        );
        BudgetRepository::confirm_spend_in_txn(
            &txn,
            contract.budget_row_id,
            statement.net_amount,
            actor_id,
            &reference,
        )
        .await?;

        let now = Utc::now().into();

        let contract_version = contract.version;
        let mut contract_active: contracts::ActiveModel = contract.into();
        contract_active.paid_amount = Set(paid_after);
        contract_active.status = Set(new_contract_status.as_str().to_string());
        contract_active.version = Set(contract_version + 1);
        contract_active.updated_at = Set(now);
        contract_active.update(&txn).await.map_err(db_err)?;

        let mut statement_active: progress_statements::ActiveModel = statement.into();
        statement_active.status = Set(new_statement_status.as_str().to_string());
        statement_active.paid_at = Set(Some(now));
        statement_active.updated_at = Set(now);
        let updated = statement_active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            statement_id = %id,
            reference = %reference,
            net = %updated.net_amount,
            "statement paid"
        );

        Ok(updated)
    }

    /// Gets a statement by ID.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::NotFound` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<progress_statements::Model, StatementError> {
        progress_statements::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(StatementError::NotFound(id))
    }

    /// Lists a contract's statements in sequence order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<Vec<progress_statements::Model>, StatementError> {
        progress_statements::Entity::find()
            .filter(progress_statements::Column::ContractId.eq(contract_id))
            .order_by_asc(progress_statements::Column::SequenceNo)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Sum of net amounts across the contract's existing statements.
    async fn cumulative_net(
        txn: &DatabaseTransaction,
        contract_id: Uuid,
    ) -> Result<Decimal, StatementError> {
        let statements = progress_statements::Entity::find()
            .filter(progress_statements::Column::ContractId.eq(contract_id))
            .all(txn)
            .await
            .map_err(db_err)?;

        Ok(statements.iter().map(|s| s.net_amount).sum())
    }

    /// Applies a pure status transition under the statement row lock.
    async fn transition(
        &self,
        id: Uuid,
        step: fn(StatementStatus) -> Result<StatementStatus, StatementError>,
    ) -> Result<progress_statements::Model, StatementError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let statement = progress_statements::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(StatementError::NotFound(id))?;

        let current = parse_statement_status(&statement.status)?;
        let new_status = step(current)?;

        let now = Utc::now().into();
        let mut active: progress_statements::ActiveModel = statement.into();
        active.status = Set(new_status.as_str().to_string());
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }
}
