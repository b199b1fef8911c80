//! Property-based tests for the approval ladder.

use proptest::prelude::*;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{AdminLevel, TransactionStatus};

fn arb_level() -> impl Strategy<Value = AdminLevel> {
    prop_oneof![
        Just(AdminLevel::L1),
        Just(AdminLevel::L2),
        Just(AdminLevel::L3),
        Just(AdminLevel::L4),
        Just(AdminLevel::Admin),
    ]
}

fn arb_pending() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::PendingL1),
        Just(TransactionStatus::PendingL2),
        Just(TransactionStatus::PendingL3),
        Just(TransactionStatus::PendingL4),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Exactly one ladder level may advance each pending status; the
    /// superuser may always advance it.
    #[test]
    fn prop_single_matching_level(status in arb_pending(), level in arb_level()) {
        let rung = status.pending_level().unwrap();
        let result = WorkflowService::approve(status, level);

        if level.is_superuser() || level.ladder_rung() == Some(rung) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(
                matches!(
                    result,
                    Err(WorkflowError::LevelMismatch { required, .. }) if required == rung
                ),
                "expected LevelMismatch with required == rung"
            );
        }
    }

    /// An approval either stays on the ladder one rung higher or
    /// finalizes; it never moves down or sideways.
    #[test]
    fn prop_approval_is_monotonic(status in arb_pending(), level in arb_level()) {
        let rung = status.pending_level().unwrap();
        if let Ok(advance) = WorkflowService::approve(status, level) {
            match advance.new_status.pending_level() {
                Some(next) => {
                    prop_assert_eq!(next, rung + 1);
                    prop_assert!(!advance.finalizes);
                }
                None => {
                    prop_assert_eq!(advance.new_status, TransactionStatus::Approved);
                    prop_assert!(advance.finalizes);
                }
            }
        }
    }

    /// Rejection lands in exactly the state the disposition asked for.
    #[test]
    fn prop_reject_disposition(status in arb_pending(), return_to_user in any::<bool>()) {
        let action = WorkflowService::reject(status, AdminLevel::Admin, "reason", return_to_user)
            .unwrap();
        if return_to_user {
            prop_assert_eq!(action.new_status, TransactionStatus::Draft);
        } else {
            prop_assert_eq!(action.new_status, TransactionStatus::Rejected);
        }
    }
}
