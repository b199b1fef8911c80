//! Accounting: journal snapshots and posting rules.
//!
//! An approved transaction is frozen into an immutable two-line journal
//! snapshot (debit: the budget row's expense account, credit: the
//! configured treasury bank account), content-addressed for tamper
//! evidence. Posting is exactly-once under optimistic version locking;
//! the pessimistic/optimistic boundary is deliberate — see the posting
//! module docs.

pub mod error;
pub mod posting;
pub mod snapshot;
pub mod types;

pub use error::PostingError;
pub use posting::{PostingService, StaleOutcome};
pub use snapshot::SnapshotBuilder;
pub use types::{
    AccountingStatus, ExpenseAccount, JournalLineDraft, JournalSide, JournalSnapshotDraft,
    ValidationStatus,
};
