//! State machine logic for the approval ladder.
//!
//! All methods are pure: they validate a transition against the current
//! status and the caller's level and return what should happen. The
//! repository applies the result plus its ledger side-effect inside one
//! database transaction.

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{AdminLevel, TransactionStatus, WorkflowEvent};

/// Result of a successful approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalAdvance {
    /// Status to write.
    pub new_status: TransactionStatus,
    /// True when the transaction entered `Approved` and the reservation
    /// must be confirmed as spent.
    pub finalizes: bool,
}

/// Result of a successful rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectAction {
    /// Status to write (`Rejected`, or `Draft` when returned to user).
    pub new_status: TransactionStatus,
    /// Event kind for the workflow log.
    pub event: WorkflowEvent,
}

/// Stateless service for approval-ladder transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Advances a pending transaction one rung (or to `Approved` for the
    /// superuser level).
    ///
    /// # Errors
    ///
    /// - `WorkflowError::InvalidTransition` when the status is not pending.
    /// - `WorkflowError::LevelMismatch` when the caller's level does not
    ///   match the waiting rung (superuser excepted).
    pub fn approve(
        current: TransactionStatus,
        level: AdminLevel,
    ) -> Result<ApprovalAdvance, WorkflowError> {
        let rung = current
            .pending_level()
            .ok_or(WorkflowError::InvalidTransition {
                from: current,
                action: "approve",
            })?;

        if level.is_superuser() {
            // The superuser collapses the remainder of the ladder.
            return Ok(ApprovalAdvance {
                new_status: TransactionStatus::Approved,
                finalizes: true,
            });
        }

        if level.ladder_rung() != Some(rung) {
            return Err(WorkflowError::LevelMismatch {
                required: rung,
                actual: level,
            });
        }

        let new_status = if rung == 4 {
            TransactionStatus::Approved
        } else {
            // rung is 1..=3 here, so the next rung always exists.
            TransactionStatus::pending_at(rung + 1).unwrap_or(TransactionStatus::Approved)
        };

        Ok(ApprovalAdvance {
            new_status,
            finalizes: new_status == TransactionStatus::Approved,
        })
    }

    /// Rejects a pending transaction, either terminally or back to the
    /// requester as a draft. The caller's release of the reservation
    /// accompanies either outcome.
    ///
    /// # Errors
    ///
    /// - `WorkflowError::ReasonRequired` when the reason is blank.
    /// - `WorkflowError::InvalidTransition` when the status is not pending.
    /// - `WorkflowError::LevelMismatch` when the caller's level does not
    ///   match the waiting rung (superuser excepted).
    pub fn reject(
        current: TransactionStatus,
        level: AdminLevel,
        reason: &str,
        return_to_user: bool,
    ) -> Result<RejectAction, WorkflowError> {
        if reason.trim().is_empty() {
            return Err(WorkflowError::ReasonRequired);
        }

        let rung = current
            .pending_level()
            .ok_or(WorkflowError::InvalidTransition {
                from: current,
                action: "reject",
            })?;

        if !level.is_superuser() && level.ladder_rung() != Some(rung) {
            return Err(WorkflowError::LevelMismatch {
                required: rung,
                actual: level,
            });
        }

        Ok(if return_to_user {
            RejectAction {
                new_status: TransactionStatus::Draft,
                event: WorkflowEvent::ReturnToUser,
            }
        } else {
            RejectAction {
                new_status: TransactionStatus::Rejected,
                event: WorkflowEvent::Reject,
            }
        })
    }

    /// Resubmits a draft transaction onto the ladder.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` unless the status is
    /// `Draft`.
    pub fn resubmit(current: TransactionStatus) -> Result<TransactionStatus, WorkflowError> {
        match current {
            TransactionStatus::Draft => Ok(TransactionStatus::PendingL1),
            _ => Err(WorkflowError::InvalidTransition {
                from: current,
                action: "resubmit",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_advances_one_rung_per_approval() {
        let mut status = TransactionStatus::PendingL1;
        let levels = [AdminLevel::L1, AdminLevel::L2, AdminLevel::L3];

        for (i, level) in levels.into_iter().enumerate() {
            let advance = WorkflowService::approve(status, level).unwrap();
            assert!(!advance.finalizes);
            assert_eq!(
                advance.new_status.pending_level(),
                Some(u8::try_from(i).unwrap() + 2)
            );
            status = advance.new_status;
        }

        let last = WorkflowService::approve(status, AdminLevel::L4).unwrap();
        assert_eq!(last.new_status, TransactionStatus::Approved);
        assert!(last.finalizes);
    }

    #[test]
    fn test_level_mismatch_rejected() {
        let err =
            WorkflowService::approve(TransactionStatus::PendingL1, AdminLevel::L2).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::LevelMismatch {
                required: 1,
                actual: AdminLevel::L2
            }
        ));
    }

    #[test]
    fn test_superuser_collapses_ladder() {
        for status in [
            TransactionStatus::PendingL1,
            TransactionStatus::PendingL2,
            TransactionStatus::PendingL3,
            TransactionStatus::PendingL4,
        ] {
            let advance = WorkflowService::approve(status, AdminLevel::Admin).unwrap();
            assert_eq!(advance.new_status, TransactionStatus::Approved);
            assert!(advance.finalizes);
        }
    }

    #[test]
    fn test_approve_terminal_states_fails() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::Approved,
            TransactionStatus::Rejected,
        ] {
            let err = WorkflowService::approve(status, AdminLevel::L1).unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn test_reject_terminal() {
        let action = WorkflowService::reject(
            TransactionStatus::PendingL2,
            AdminLevel::L2,
            "missing cost center",
            false,
        )
        .unwrap();
        assert_eq!(action.new_status, TransactionStatus::Rejected);
        assert_eq!(action.event, WorkflowEvent::Reject);
    }

    #[test]
    fn test_reject_returns_to_user() {
        let action = WorkflowService::reject(
            TransactionStatus::PendingL3,
            AdminLevel::Admin,
            "resubmit with attachment",
            true,
        )
        .unwrap();
        assert_eq!(action.new_status, TransactionStatus::Draft);
        assert_eq!(action.event, WorkflowEvent::ReturnToUser);
    }

    #[test]
    fn test_reject_requires_reason() {
        let err = WorkflowService::reject(TransactionStatus::PendingL1, AdminLevel::L1, "  ", false)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ReasonRequired));
    }

    #[test]
    fn test_reject_checks_level() {
        let err = WorkflowService::reject(
            TransactionStatus::PendingL4,
            AdminLevel::L1,
            "wrong budget line",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::LevelMismatch { required: 4, .. }));
    }

    #[test]
    fn test_resubmit_only_from_draft() {
        assert_eq!(
            WorkflowService::resubmit(TransactionStatus::Draft).unwrap(),
            TransactionStatus::PendingL1
        );
        assert!(WorkflowService::resubmit(TransactionStatus::PendingL1).is_err());
        assert!(WorkflowService::resubmit(TransactionStatus::Rejected).is_err());
    }
}
