//! Workflow repository: approval-ladder transitions with their ledger
//! side-effects.
//!
//! The transaction row is locked (`SELECT ... FOR UPDATE`) for the
//! duration of each transition so concurrent approvals of the same
//! transaction serialize; the terminal approval confirms the reservation
//! through [`BudgetRepository::confirm_spend_in_txn`] — the budget
//! service is the single spend-realization call-site, the approval path
//! never re-derives the arithmetic.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use fisca_core::workflow::{AdminLevel, TransactionStatus, WorkflowError, WorkflowService};

use crate::entities::transactions;
use crate::repositories::budget::BudgetRepository;
use crate::repositories::transaction::{append_workflow_log, parse_status};

fn db_err(e: DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

/// Workflow repository for transaction state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Advances a pending transaction one rung; the level-4 (or
    /// superuser) approval finalizes the ledger.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::LevelMismatch` when the caller's level does not
    ///   match the waiting rung.
    /// - `WorkflowError::InvalidTransition` when the transaction is not
    ///   pending.
    pub async fn approve(
        &self,
        transaction_id: Uuid,
        actor_id: Uuid,
        level: AdminLevel,
        comment: Option<String>,
    ) -> Result<transactions::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let tx = transactions::Entity::find_by_id(transaction_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::NotFound(transaction_id))?;

        let current = parse_status(&tx.status)?;
        let advance = WorkflowService::approve(current, level)?;

        if advance.finalizes {
            // Terminal approval: the reservation becomes spend.
            BudgetRepository::confirm_spend_in_txn(
                &txn,
                tx.budget_row_id,
                tx.amount,
                actor_id,
                &tx.unique_code,
            )
            .await?;
        }

        let now = Utc::now().into();
        let version = tx.version;
        let mut active: transactions::ActiveModel = tx.into();
        active.status = Set(advance.new_status.as_str().to_string());
        active.version = Set(version + 1);
        if advance.finalizes {
            active.accounting_status = Set(Some(
                fisca_core::accounting::AccountingStatus::ReadyToPost
                    .as_str()
                    .to_string(),
            ));
        }
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        append_workflow_log(
            &txn,
            transaction_id,
            current,
            advance.new_status,
            fisca_core::workflow::WorkflowEvent::Approve,
            Some(level),
            actor_id,
            comment,
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        info!(
            transaction_id = %transaction_id,
            from = %current,
            to = %advance.new_status,
            finalized = advance.finalizes,
            "transaction approved"
        );

        Ok(updated)
    }

    /// Rejects a pending transaction, terminally or back to the
    /// requester, releasing the full reservation either way.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::ReasonRequired` when the reason is blank.
    /// - `WorkflowError::LevelMismatch` / `InvalidTransition` per the
    ///   state machine.
    pub async fn reject(
        &self,
        transaction_id: Uuid,
        actor_id: Uuid,
        level: AdminLevel,
        reason: &str,
        return_to_user: bool,
    ) -> Result<transactions::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let tx = transactions::Entity::find_by_id(transaction_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::NotFound(transaction_id))?;

        let current = parse_status(&tx.status)?;
        let action = WorkflowService::reject(current, level, reason, return_to_user)?;

        BudgetRepository::release_funds_in_txn(
            &txn,
            tx.budget_row_id,
            tx.amount,
            actor_id,
            &tx.unique_code,
        )
        .await?;

        let now = Utc::now().into();
        let version = tx.version;
        let mut active: transactions::ActiveModel = tx.into();
        active.status = Set(action.new_status.as_str().to_string());
        active.version = Set(version + 1);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        append_workflow_log(
            &txn,
            transaction_id,
            current,
            action.new_status,
            action.event,
            Some(level),
            actor_id,
            Some(reason.to_string()),
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        info!(
            transaction_id = %transaction_id,
            from = %current,
            to = %action.new_status,
            "transaction rejected"
        );

        Ok(updated)
    }

    /// Puts a returned draft back onto the ladder, reserving its amount
    /// again.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::InvalidTransition` unless the transaction is in
    ///   `Draft`.
    /// - `WorkflowError::Ledger(InsufficientFunds)` when the budget row
    ///   can no longer cover the amount.
    pub async fn resubmit(
        &self,
        transaction_id: Uuid,
        actor_id: Uuid,
    ) -> Result<transactions::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let tx = transactions::Entity::find_by_id(transaction_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::NotFound(transaction_id))?;

        let current = parse_status(&tx.status)?;
        let new_status = WorkflowService::resubmit(current)?;

        BudgetRepository::block_funds_in_txn(
            &txn,
            tx.budget_row_id,
            tx.amount,
            actor_id,
            &tx.unique_code,
        )
        .await?;

        let now = Utc::now().into();
        let version = tx.version;
        let mut active: transactions::ActiveModel = tx.into();
        active.status = Set(new_status.as_str().to_string());
        active.version = Set(version + 1);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await.map_err(db_err)?;

        append_workflow_log(
            &txn,
            transaction_id,
            current,
            new_status,
            fisca_core::workflow::WorkflowEvent::Submit,
            None,
            actor_id,
            None,
        )
        .await?;

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    /// Convenience for handlers: parses a stored status string.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::Database` for unknown values.
    pub fn status_of(tx: &transactions::Model) -> Result<TransactionStatus, WorkflowError> {
        parse_status(&tx.status)
    }
}
