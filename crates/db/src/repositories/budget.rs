//! Budget repository: the only mutation path into the ledger store.
//!
//! Every mutation runs inside one database transaction and takes a
//! row-level write lock (`SELECT ... FOR UPDATE`) on the target
//! `budget_rows` row before reading its balances. Two concurrent
//! `block_funds` calls against the same row therefore serialize on the
//! lock; the second re-reads the balance after the first commits, so a
//! lost update is impossible.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use fisca_core::budget::{LedgerBalances, LedgerError, LedgerOperation, LedgerService};
use fisca_shared::types::PageRequest;

use crate::entities::{budget_rows, budget_transactions};

/// Input for creating a budget row at import time.
#[derive(Debug, Clone)]
pub struct CreateBudgetRowInput {
    /// Owning activity.
    pub activity_id: Uuid,
    /// Owning org unit; `None` means globally visible.
    pub org_unit_id: Option<Uuid>,
    /// Unique budget coding.
    pub budget_coding: String,
    /// Approved amount for the fiscal year.
    pub approved_amount: Decimal,
    /// Fiscal year.
    pub fiscal_year: i16,
}

/// Reads a row's balances into the core value type.
#[must_use]
pub fn row_balances(row: &budget_rows::Model) -> LedgerBalances {
    LedgerBalances {
        approved: row.approved_amount,
        blocked: row.blocked_amount,
        spent: row.spent_amount,
    }
}

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

/// Budget repository for ledger operations and row access.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Row access
    // ========================================================================

    /// Creates a budget row. Used by the import seeder; rows are never
    /// created through the request path.
    ///
    /// # Errors
    ///
    /// Returns an error if the approved amount is negative or the
    /// database operation fails.
    pub async fn create_row(
        &self,
        input: CreateBudgetRowInput,
    ) -> Result<budget_rows::Model, LedgerError> {
        if input.approved_amount < Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(input.approved_amount));
        }

        let now = Utc::now().into();
        let row = budget_rows::ActiveModel {
            id: Set(Uuid::new_v4()),
            activity_id: Set(input.activity_id),
            org_unit_id: Set(input.org_unit_id),
            budget_coding: Set(input.budget_coding),
            approved_amount: Set(input.approved_amount),
            blocked_amount: Set(Decimal::ZERO),
            spent_amount: Set(Decimal::ZERO),
            fiscal_year: Set(input.fiscal_year),
            created_at: Set(now),
            updated_at: Set(now),
        };

        row.insert(&self.db).await.map_err(db_err)
    }

    /// Gets a budget row by ID.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::RowNotFound` when the row does not exist.
    pub async fn get_row(&self, id: Uuid) -> Result<budget_rows::Model, LedgerError> {
        budget_rows::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::RowNotFound(id))
    }

    /// Gets a budget row by its unique coding.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_row_by_coding(
        &self,
        coding: &str,
    ) -> Result<Option<budget_rows::Model>, LedgerError> {
        budget_rows::Entity::find()
            .filter(budget_rows::Column::BudgetCoding.eq(coding))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists budget rows for a fiscal year, newest coding first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_rows(
        &self,
        fiscal_year: Option<i16>,
        page: &PageRequest,
    ) -> Result<Vec<budget_rows::Model>, LedgerError> {
        let mut query = budget_rows::Entity::find();
        if let Some(year) = fiscal_year {
            query = query.filter(budget_rows::Column::FiscalYear.eq(year));
        }

        query
            .order_by_asc(budget_rows::Column::BudgetCoding)
            .offset(page.offset())
            .limit(u64::from(page.limit()))
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Returns the append-only audit trail of a row, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        budget_row_id: Uuid,
    ) -> Result<Vec<budget_transactions::Model>, LedgerError> {
        budget_transactions::Entity::find()
            .filter(budget_transactions::Column::BudgetRowId.eq(budget_row_id))
            .order_by_asc(budget_transactions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    // ========================================================================
    // Ledger mutations
    // ========================================================================

    /// Reserves funds against a budget row.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InsufficientFunds` when the amount exceeds
    /// the remaining balance; no state changes on failure.
    pub async fn block_funds(
        &self,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        self.apply(LedgerOperation::Block, budget_row_id, amount, user_id, reference_doc)
            .await
    }

    /// Returns previously blocked funds to the available pool.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidOperation` when the amount exceeds
    /// the blocked amount.
    pub async fn release_funds(
        &self,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        self.apply(LedgerOperation::Release, budget_row_id, amount, user_id, reference_doc)
            .await
    }

    /// Converts blocked funds into permanent expenditure.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidOperation` when the amount exceeds
    /// the blocked amount (spend must come out of a prior block).
    pub async fn confirm_spend(
        &self,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        self.apply(LedgerOperation::Confirm, budget_row_id, amount, user_id, reference_doc)
            .await
    }

    async fn apply(
        &self,
        operation: LedgerOperation,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let row = Self::apply_in_txn(&txn, operation, budget_row_id, amount, user_id, reference_doc)
            .await?;
        txn.commit().await.map_err(db_err)?;
        Ok(row)
    }

    /// Reserves funds inside an already-open transaction, so callers can
    /// compose the reservation with their own writes atomically.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::block_funds`].
    pub async fn block_funds_in_txn(
        txn: &DatabaseTransaction,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        Self::apply_in_txn(txn, LedgerOperation::Block, budget_row_id, amount, user_id, reference_doc)
            .await
    }

    /// Releases funds inside an already-open transaction.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::release_funds`].
    pub async fn release_funds_in_txn(
        txn: &DatabaseTransaction,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        Self::apply_in_txn(txn, LedgerOperation::Release, budget_row_id, amount, user_id, reference_doc)
            .await
    }

    /// Confirms spend inside an already-open transaction. The terminal
    /// approval transition and statement payments go through here — this
    /// is the single spend-realization call-site in the system.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::confirm_spend`].
    pub async fn confirm_spend_in_txn(
        txn: &DatabaseTransaction,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        Self::apply_in_txn(txn, LedgerOperation::Confirm, budget_row_id, amount, user_id, reference_doc)
            .await
    }

    /// The one read-modify-write: lock the row, run the core arithmetic,
    /// write the new balances plus the audit record.
    async fn apply_in_txn(
        txn: &DatabaseTransaction,
        operation: LedgerOperation,
        budget_row_id: Uuid,
        amount: Decimal,
        user_id: Uuid,
        reference_doc: &str,
    ) -> Result<budget_rows::Model, LedgerError> {
        // Row lock held until the surrounding transaction commits.
        let row = budget_rows::Entity::find_by_id(budget_row_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::RowNotFound(budget_row_id))?;

        let before = row_balances(&row);
        let after = LedgerService::apply(before, operation, amount)?;

        let now = Utc::now().into();
        let mut active: budget_rows::ActiveModel = row.into();
        active.blocked_amount = Set(after.blocked);
        active.spent_amount = Set(after.spent);
        active.updated_at = Set(now);
        let updated = active.update(txn).await.map_err(db_err)?;

        let audit = budget_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            budget_row_id: Set(budget_row_id),
            operation: Set(operation.as_str().to_string()),
            amount: Set(amount),
            user_id: Set(user_id),
            reference_doc: Set(reference_doc.to_string()),
            pre_blocked: Set(before.blocked),
            pre_spent: Set(before.spent),
            post_blocked: Set(after.blocked),
            post_spent: Set(after.spent),
            created_at: Set(now),
        };
        audit.insert(txn).await.map_err(db_err)?;

        info!(
            budget_row_id = %budget_row_id,
            operation = %operation,
            %amount,
            remaining = %after.remaining(),
            "ledger mutation applied"
        );

        Ok(updated)
    }
}
