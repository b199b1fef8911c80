//! Accounting repository: journal snapshots and exactly-once posting.
//!
//! The posting path deliberately uses optimistic concurrency (a version
//! column checked in a conditional UPDATE) instead of the ledger's
//! pessimistic row lock: posting contention is rare, so a
//! retry-on-conflict contract buys shorter lock hold time. The
//! conditional UPDATE succeeds for at most one caller; everyone else is
//! disambiguated by re-reading the row.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use fisca_core::accounting::{
    AccountingStatus, ExpenseAccount, PostingError, PostingService, SnapshotBuilder, StaleOutcome,
    ValidationStatus,
};
use fisca_core::workflow::TransactionStatus;

use crate::entities::{
    accounting_audit_logs, activities, budget_rows, journal_lines, journal_snapshots, transactions,
};

fn db_err(e: DbErr) -> PostingError {
    PostingError::Database(e.to_string())
}

/// A frozen snapshot with its lines.
#[derive(Debug, Clone)]
pub struct JournalPreview {
    /// Snapshot header.
    pub snapshot: journal_snapshots::Model,
    /// Debit/credit lines in line order.
    pub lines: Vec<journal_lines::Model>,
}

/// Result of a successful (or idempotently replayed) posting.
#[derive(Debug, Clone)]
pub struct PostingReceipt {
    /// The posted transaction.
    pub transaction_id: Uuid,
    /// Posting reference.
    pub posting_ref: String,
    /// When the posting was applied (the original instant on replay).
    pub posted_at: chrono::DateTime<chrono::FixedOffset>,
    /// Row version after posting.
    pub version: i32,
    /// True when this call was a replay of an earlier success.
    pub idempotent: bool,
}

/// Accounting repository.
#[derive(Debug, Clone)]
pub struct AccountingRepository {
    db: DatabaseConnection,
    bank_account_code: String,
    bank_account_name: String,
}

impl AccountingRepository {
    /// Creates a new accounting repository. The bank account is the
    /// fixed credit side of every journal snapshot.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        bank_account_code: String,
        bank_account_name: String,
    ) -> Self {
        Self {
            db,
            bank_account_code,
            bank_account_name,
        }
    }

    /// Returns the frozen snapshot for a transaction, creating it on
    /// first call. Subsequent calls return the stored snapshot
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - `PostingError::NotFound` for an unknown transaction.
    /// - `PostingError::InvalidState` when the transaction has not
    ///   completed workflow approval.
    pub async fn journal_preview(
        &self,
        transaction_id: Uuid,
        actor_id: Uuid,
    ) -> Result<JournalPreview, PostingError> {
        if let Some(existing) = self.find_preview(transaction_id).await? {
            return Ok(existing);
        }

        let tx = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::NotFound(transaction_id))?;

        let status = TransactionStatus::parse(&tx.status)
            .ok_or_else(|| PostingError::Database(format!("corrupt status: {}", tx.status)))?;
        if status != TransactionStatus::Approved {
            return Err(PostingError::InvalidState(
                "journal preview requires a fully approved transaction",
            ));
        }

        let expense = self.expense_account(tx.budget_row_id).await?;
        let draft = SnapshotBuilder::build(
            tx.id,
            tx.amount,
            expense.as_ref(),
            &self.bank_account_code,
            &self.bank_account_name,
        );

        let txn = self.db.begin().await.map_err(db_err)?;
        let now = Utc::now().into();

        let snapshot = journal_snapshots::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(tx.id),
            total_debit: Set(draft.total_debit),
            total_credit: Set(draft.total_credit),
            is_balanced: Set(draft.is_balanced),
            validation_status: Set(draft.validation_status.as_str().to_string()),
            content_hash: Set(draft.content_hash.clone()),
            created_at: Set(now),
        };
        let inserted = match snapshot.insert(&txn).await {
            Ok(model) => model,
            Err(e) => {
                // Lost a create race: someone else froze it first. Their
                // snapshot is the snapshot.
                drop(txn);
                warn!(transaction_id = %transaction_id, error = %e,
                    "snapshot insert failed, re-reading");
                return self
                    .find_preview(transaction_id)
                    .await?
                    .ok_or_else(|| db_err(e));
            }
        };

        for line in &draft.lines {
            let model = journal_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                snapshot_id: Set(inserted.id),
                line_no: Set(line.line_no),
                account_code: Set(line.account_code.clone()),
                account_name: Set(line.account_name.clone()),
                side: Set(line.side.as_str().to_string()),
                amount: Set(line.amount),
                created_at: Set(now),
            };
            model.insert(&txn).await.map_err(db_err)?;
        }

        if tx.accounting_status.is_none() {
            let mut active: transactions::ActiveModel = tx.into();
            active.accounting_status =
                Set(Some(AccountingStatus::ReadyToPost.as_str().to_string()));
            active.updated_at = Set(now);
            active.update(&txn).await.map_err(db_err)?;
        }

        Self::append_audit(
            &txn,
            transaction_id,
            "snapshot_created",
            Some(draft.content_hash),
            actor_id,
        )
        .await?;

        txn.commit().await.map_err(db_err)?;

        self.find_preview(transaction_id)
            .await?
            .ok_or_else(|| PostingError::Database("snapshot vanished after insert".to_string()))
    }

    /// Posts a transaction exactly once.
    ///
    /// The conditional UPDATE checks the caller's version and the
    /// postable accounting states; zero affected rows means someone got
    /// there first, and a re-read distinguishes idempotent replay,
    /// conflicting reference, and plain version mismatch.
    ///
    /// # Errors
    ///
    /// - `PostingError::Conflict` when posted under a different ref.
    /// - `PostingError::VersionMismatch` when another actor moved first.
    /// - `PostingError::InvalidState` / `SnapshotBlocked` per the
    ///   posting rules.
    pub async fn post(
        &self,
        transaction_id: Uuid,
        posting_ref: &str,
        expected_version: i32,
        notes: Option<String>,
        actor_id: Uuid,
    ) -> Result<PostingReceipt, PostingError> {
        let tx = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::NotFound(transaction_id))?;

        // The snapshot is frozen lazily if preview was never called.
        let preview = self.journal_preview(transaction_id, actor_id).await?;

        let status = TransactionStatus::parse(&tx.status)
            .ok_or_else(|| PostingError::Database(format!("corrupt status: {}", tx.status)))?;
        let accounting_status = tx
            .accounting_status
            .as_deref()
            .and_then(AccountingStatus::parse);
        let validation = ValidationStatus::parse(&preview.snapshot.validation_status)
            .ok_or_else(|| {
                PostingError::Database(format!(
                    "corrupt validation status: {}",
                    preview.snapshot.validation_status
                ))
            })?;

        PostingService::ensure_postable(status, accounting_status, validation)?;

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
        let txn = self.db.begin().await.map_err(db_err)?;

        let update = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::AccountingStatus,
                Expr::value(AccountingStatus::Posted.as_str()),
            )
            .col_expr(transactions::Column::PostingRef, Expr::value(posting_ref))
            .col_expr(transactions::Column::PostingNotes, Expr::value(notes))
            .col_expr(transactions::Column::PostedAt, Expr::value(now))
            .col_expr(transactions::Column::PostedBy, Expr::value(actor_id))
            .col_expr(
                transactions::Column::Version,
                Expr::col(transactions::Column::Version).add(1),
            )
            .col_expr(transactions::Column::UpdatedAt, Expr::value(now))
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::Version.eq(expected_version))
            .filter(
                Condition::any()
                    .add(transactions::Column::AccountingStatus.is_null())
                    .add(
                        transactions::Column::AccountingStatus
                            .eq(AccountingStatus::ReadyToPost.as_str()),
                    ),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if update.rows_affected == 1 {
            Self::append_audit(
                &txn,
                transaction_id,
                "posted",
                Some(posting_ref.to_string()),
                actor_id,
            )
            .await?;
            txn.commit().await.map_err(db_err)?;

            info!(
                transaction_id = %transaction_id,
                posting_ref = %posting_ref,
                "transaction posted"
            );

            return Ok(PostingReceipt {
                transaction_id,
                posting_ref: posting_ref.to_string(),
                posted_at: now,
                version: expected_version + 1,
                idempotent: false,
            });
        }

        // Zero rows: drop the write transaction and find out why.
        txn.rollback().await.map_err(db_err)?;

        let current = transactions::Entity::find_by_id(transaction_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::NotFound(transaction_id))?;

        let current_status = current
            .accounting_status
            .as_deref()
            .and_then(AccountingStatus::parse);

        match PostingService::resolve_stale_update(
            current_status,
            current.posting_ref.as_deref(),
            current.version,
            posting_ref,
        ) {
            StaleOutcome::IdempotentReplay => {
                Self::append_audit_on(
                    &self.db,
                    transaction_id,
                    "idempotent_replay",
                    Some(posting_ref.to_string()),
                    actor_id,
                )
                .await?;

                Ok(PostingReceipt {
                    transaction_id,
                    posting_ref: posting_ref.to_string(),
                    posted_at: current.posted_at.unwrap_or(now),
                    version: current.version,
                    idempotent: true,
                })
            }
            StaleOutcome::Conflict { existing_ref } => {
                Self::append_audit_on(
                    &self.db,
                    transaction_id,
                    "posting_conflict",
                    Some(format!("requested {posting_ref}, posted {existing_ref}")),
                    actor_id,
                )
                .await?;

                Err(PostingError::Conflict { existing_ref })
            }
            StaleOutcome::VersionMismatch { actual } => Err(PostingError::VersionMismatch {
                expected: expected_version,
                actual,
            }),
        }
    }

    /// Returns the posting audit trail for a transaction, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn audit_log(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<accounting_audit_logs::Model>, PostingError> {
        accounting_audit_logs::Entity::find()
            .filter(accounting_audit_logs::Column::TransactionId.eq(transaction_id))
            .order_by_asc(accounting_audit_logs::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn find_preview(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<JournalPreview>, PostingError> {
        let Some(snapshot) = journal_snapshots::Entity::find()
            .filter(journal_snapshots::Column::TransactionId.eq(transaction_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::SnapshotId.eq(snapshot.id))
            .order_by_asc(journal_lines::Column::LineNo)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Some(JournalPreview { snapshot, lines }))
    }

    /// Derives the expense (debit) account from the budget row; `None`
    /// degrades the snapshot to a WARNING.
    async fn expense_account(
        &self,
        budget_row_id: Uuid,
    ) -> Result<Option<ExpenseAccount>, PostingError> {
        let Some(row) = budget_rows::Entity::find_by_id(budget_row_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let name = activities::Entity::find_by_id(row.activity_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map_or_else(|| row.budget_coding.clone(), |a| a.name);

        Ok(Some(ExpenseAccount {
            code: row.budget_coding,
            name,
        }))
    }

    async fn append_audit(
        txn: &sea_orm::DatabaseTransaction,
        transaction_id: Uuid,
        action: &str,
        detail: Option<String>,
        actor_id: Uuid,
    ) -> Result<(), PostingError> {
        let log = accounting_audit_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            action: Set(action.to_string()),
            detail: Set(detail),
            actor_id: Set(actor_id),
            created_at: Set(Utc::now().into()),
        };
        log.insert(txn).await.map_err(db_err)?;
        Ok(())
    }

    async fn append_audit_on(
        db: &DatabaseConnection,
        transaction_id: Uuid,
        action: &str,
        detail: Option<String>,
        actor_id: Uuid,
    ) -> Result<(), PostingError> {
        let log = accounting_audit_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            action: Set(action.to_string()),
            detail: Set(detail),
            actor_id: Set(actor_id),
            created_at: Set(Utc::now().into()),
        };
        log.insert(db).await.map_err(db_err)?;
        Ok(())
    }
}
