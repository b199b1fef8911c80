//! Transaction repository: creation and reads.
//!
//! Creation inserts the transaction at `pending_l1` and reserves its
//! amount in the same database transaction — if funds are insufficient
//! nothing is persisted.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use fisca_core::workflow::{AdminLevel, TransactionStatus, WorkflowError, WorkflowEvent};
use fisca_shared::types::PageRequest;
use fisca_shared::UniqueCode;

use crate::entities::{transactions, workflow_logs};
use crate::repositories::budget::BudgetRepository;

/// Coordinates of the 11-part business key that the caller supplies;
/// the repository fills in the date and the same-day occurrence counter.
#[derive(Debug, Clone, Copy)]
pub struct CodeCoordinates {
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

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Short title.
    pub title: String,
    /// Amount to reserve.
    pub amount: Decimal,
    /// Budget row the transaction draws from.
    pub budget_row_id: Uuid,
    /// Optional beneficiary registry code.
    pub beneficiary_code: Option<String>,
    /// Business-key coordinates.
    pub code: CodeCoordinates,
    /// Requesting user.
    pub created_by: Uuid,
}

fn db_err(e: DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

/// Parses a stored status column, treating anything unknown as data
/// corruption rather than a user error.
pub(crate) fn parse_status(raw: &str) -> Result<TransactionStatus, WorkflowError> {
    TransactionStatus::parse(raw)
        .ok_or_else(|| WorkflowError::Database(format!("corrupt transaction status: {raw}")))
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction: assigns the next free occurrence of the
    /// business key, reserves the amount, inserts at `pending_l1`, and
    /// logs the submission — all in one database transaction.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::Ledger(InsufficientFunds)` when the reservation
    ///   fails; nothing is persisted.
    /// - `WorkflowError::Database` on storage failures.
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let unique_code = Self::assign_code(&txn, input.code).await?;
        let code_string = unique_code.to_string();

        // Reservation first: an insufficient balance aborts before any
        // transaction row exists.
        BudgetRepository::block_funds_in_txn(
            &txn,
            input.budget_row_id,
            input.amount,
            input.created_by,
            &code_string,
        )
        .await?;

        let now = Utc::now().into();
        let status = TransactionStatus::PendingL1;
        let model = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            unique_code: Set(code_string),
            title: Set(input.title),
            status: Set(status.as_str().to_string()),
            amount: Set(input.amount),
            budget_row_id: Set(input.budget_row_id),
            beneficiary_code: Set(input.beneficiary_code),
            version: Set(0),
            accounting_status: Set(None),
            posting_ref: Set(None),
            posting_notes: Set(None),
            posted_at: Set(None),
            posted_by: Set(None),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(&txn).await.map_err(db_err)?;

        let log = workflow_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(inserted.id),
            previous_status: Set(TransactionStatus::Draft.as_str().to_string()),
            new_status: Set(status.as_str().to_string()),
            action: Set(WorkflowEvent::Submit.as_str().to_string()),
            admin_level: Set(0),
            actor_id: Set(input.created_by),
            comment: Set(None),
            created_at: Set(now),
        };
        log.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(inserted)
    }

    /// Gets a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotFound` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<transactions::Model, WorkflowError> {
        transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::NotFound(id))
    }

    /// Lists transactions, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        status: Option<TransactionStatus>,
        page: &PageRequest,
    ) -> Result<Vec<transactions::Model>, WorkflowError> {
        let mut query = transactions::Entity::find();
        if let Some(status) = status {
            query = query.filter(transactions::Column::Status.eq(status.as_str()));
        }

        query
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.limit()))
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Returns the workflow log of a transaction, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn workflow_log(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<workflow_logs::Model>, WorkflowError> {
        workflow_logs::Entity::find()
            .filter(workflow_logs::Column::TransactionId.eq(transaction_id))
            .order_by_asc(workflow_logs::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Builds today's business key for the coordinates, occurrence set
    /// to one past the number of codes already sharing the prefix. The
    /// unique index on `unique_code` backstops the rare race between
    /// two same-coordinate creations.
    async fn assign_code(
        txn: &DatabaseTransaction,
        code: CodeCoordinates,
    ) -> Result<UniqueCode, WorkflowError> {
        let mut candidate = UniqueCode {
            zone: code.zone,
            department: code.department,
            section: code.section,
            budget: code.budget,
            cost_center: code.cost_center,
            continuous_activity: code.continuous_activity,
            special_activity: code.special_activity,
            beneficiary: code.beneficiary,
            event: code.event,
            date: Utc::now().date_naive(),
            occurrence: 1,
        };
        candidate
            .validate()
            .map_err(|e| WorkflowError::Database(format!("invalid code coordinates: {e}")))?;

        let full = candidate.to_string();
        let prefix = full
            .rsplit_once('-')
            .map_or(full.as_str(), |(head, _)| head);

        let existing = transactions::Entity::find()
            .filter(transactions::Column::UniqueCode.like(format!("{prefix}-%")))
            .count(txn)
            .await
            .map_err(db_err)?;

        let occurrence = u8::try_from(existing + 1).map_err(|_| {
            WorkflowError::Database(format!("occurrence counter exhausted for {prefix}"))
        })?;
        if occurrence > 99 {
            return Err(WorkflowError::Database(format!(
                "occurrence counter exhausted for {prefix}"
            )));
        }

        candidate.occurrence = occurrence;
        Ok(candidate)
    }
}

/// Appends a workflow log row inside an open transaction.
pub(crate) async fn append_workflow_log(
    txn: &DatabaseTransaction,
    transaction_id: Uuid,
    previous: TransactionStatus,
    new: TransactionStatus,
    event: WorkflowEvent,
    level: Option<AdminLevel>,
    actor_id: Uuid,
    comment: Option<String>,
) -> Result<(), WorkflowError> {
    let log = workflow_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        transaction_id: Set(transaction_id),
        previous_status: Set(previous.as_str().to_string()),
        new_status: Set(new.as_str().to_string()),
        action: Set(event.as_str().to_string()),
        admin_level: Set(level.map_or(0, |l| l.as_i16())),
        actor_id: Set(actor_id),
        comment: Set(comment),
        created_at: Set(Utc::now().into()),
    };
    log.insert(txn).await.map_err(db_err)?;
    Ok(())
}
