//! Posting decision rules.
//!
//! Posting uses optimistic concurrency (a version column checked in a
//! conditional UPDATE) where the budget ledger uses a pessimistic row
//! lock: posting contention is rare and short lock hold time matters
//! more. These helpers are the pure halves of that protocol; the
//! repository issues the actual conditional UPDATE and, when it affects
//! zero rows, re-reads and asks [`PostingService::resolve_stale_update`]
//! which of the three failure cases applies.

use crate::accounting::error::PostingError;
use crate::accounting::types::{AccountingStatus, ValidationStatus};
use crate::workflow::TransactionStatus;

/// Outcome of disambiguating a zero-row conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleOutcome {
    /// Same posting reference already applied: return the original
    /// result, change nothing.
    IdempotentReplay,
    /// Posted under a different reference.
    Conflict {
        /// The reference it was posted under.
        existing_ref: String,
    },
    /// Someone else advanced the version first.
    VersionMismatch {
        /// Version currently on the row.
        actual: i32,
    },
}

/// Stateless posting rules.
pub struct PostingService;

impl PostingService {
    /// Checks whether a transaction may enter the posting protocol.
    ///
    /// # Errors
    ///
    /// - `PostingError::InvalidState` unless the workflow status is
    ///   `Approved` and the accounting status is empty or `ReadyToPost`.
    /// - `PostingError::SnapshotBlocked` when the snapshot failed
    ///   validation.
    pub fn ensure_postable(
        workflow_status: TransactionStatus,
        accounting_status: Option<AccountingStatus>,
        validation_status: ValidationStatus,
    ) -> Result<(), PostingError> {
        if workflow_status != TransactionStatus::Approved {
            return Err(PostingError::InvalidState(
                "workflow approval is not complete",
            ));
        }

        if accounting_status == Some(AccountingStatus::Posted) {
            // Not an error yet: the caller resolves replay vs conflict
            // from the stored posting reference.
            return Ok(());
        }

        if validation_status == ValidationStatus::Blocked {
            return Err(PostingError::SnapshotBlocked);
        }

        Ok(())
    }

    /// Disambiguates a conditional update that affected zero rows, from
    /// the re-read row state.
    #[must_use]
    pub fn resolve_stale_update(
        current_status: Option<AccountingStatus>,
        current_ref: Option<&str>,
        current_version: i32,
        requested_ref: &str,
    ) -> StaleOutcome {
        if current_status == Some(AccountingStatus::Posted) {
            return match current_ref {
                Some(existing) if existing == requested_ref => StaleOutcome::IdempotentReplay,
                Some(existing) => StaleOutcome::Conflict {
                    existing_ref: existing.to_string(),
                },
                // Posted with no reference should not happen; surface it
                // as a conflict rather than silently replaying.
                None => StaleOutcome::Conflict {
                    existing_ref: String::new(),
                },
            };
        }

        StaleOutcome::VersionMismatch {
            actual: current_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postable_requires_workflow_approval() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::PendingL1,
            TransactionStatus::PendingL4,
            TransactionStatus::Rejected,
        ] {
            let err = PostingService::ensure_postable(status, None, ValidationStatus::Valid)
                .unwrap_err();
            assert!(matches!(err, PostingError::InvalidState(_)));
        }

        assert!(PostingService::ensure_postable(
            TransactionStatus::Approved,
            None,
            ValidationStatus::Valid
        )
        .is_ok());
    }

    #[test]
    fn test_blocked_snapshot_refused() {
        let err = PostingService::ensure_postable(
            TransactionStatus::Approved,
            Some(AccountingStatus::ReadyToPost),
            ValidationStatus::Blocked,
        )
        .unwrap_err();
        assert!(matches!(err, PostingError::SnapshotBlocked));
    }

    #[test]
    fn test_warning_snapshot_still_postable() {
        assert!(PostingService::ensure_postable(
            TransactionStatus::Approved,
            Some(AccountingStatus::ReadyToPost),
            ValidationStatus::Warning,
        )
        .is_ok());
    }

    #[test]
    fn test_stale_same_ref_is_idempotent_replay() {
        let outcome = PostingService::resolve_stale_update(
            Some(AccountingStatus::Posted),
            Some("TRSY-2025-0042"),
            3,
            "TRSY-2025-0042",
        );
        assert_eq!(outcome, StaleOutcome::IdempotentReplay);
    }

    #[test]
    fn test_stale_different_ref_is_conflict() {
        let outcome = PostingService::resolve_stale_update(
            Some(AccountingStatus::Posted),
            Some("TRSY-2025-0042"),
            3,
            "TRSY-2025-0099",
        );
        assert_eq!(
            outcome,
            StaleOutcome::Conflict {
                existing_ref: "TRSY-2025-0042".to_string()
            }
        );
    }

    #[test]
    fn test_stale_unposted_is_version_mismatch() {
        let outcome = PostingService::resolve_stale_update(
            Some(AccountingStatus::ReadyToPost),
            None,
            7,
            "TRSY-2025-0042",
        );
        assert_eq!(outcome, StaleOutcome::VersionMismatch { actual: 7 });
    }
}
