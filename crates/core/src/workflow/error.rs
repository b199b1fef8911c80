//! Workflow error types.

use thiserror::Error;
use uuid::Uuid;

use crate::budget::LedgerError;
use crate::workflow::types::{AdminLevel, TransactionStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The requested action is not valid from the current status.
    #[error("Cannot {action} a transaction in status {from}")]
    InvalidTransition {
        /// The current status.
        from: TransactionStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// The caller's admin level does not match the pending rung.
    #[error("Transaction is waiting for level {required}, caller is {actual}")]
    LevelMismatch {
        /// The rung the transaction is waiting on.
        required: u8,
        /// The caller's level.
        actual: AdminLevel,
    },

    /// The caller has no approval authority at all.
    #[error("Caller has no approval authority")]
    NoApprovalAuthority,

    /// Rejection requires a reason.
    #[error("Rejection reason is required")]
    ReasonRequired,

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// A ledger side-effect failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 409,
            Self::LevelMismatch { .. } | Self::NoApprovalAuthority => 403,
            Self::ReasonRequired => 400,
            Self::NotFound(_) => 404,
            Self::Ledger(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the machine-readable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::LevelMismatch { .. } => "LEVEL_MISMATCH",
            Self::NoApprovalAuthority => "NO_APPROVAL_AUTHORITY",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::NotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_level_mismatch_is_403() {
        let err = WorkflowError::LevelMismatch {
            required: 2,
            actual: AdminLevel::L1,
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "LEVEL_MISMATCH");
        assert!(err.to_string().contains("level 2"));
    }

    #[test]
    fn test_invalid_transition_is_409() {
        let err = WorkflowError::InvalidTransition {
            from: TransactionStatus::Approved,
            action: "approve",
        };
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_ledger_errors_pass_through() {
        let err = WorkflowError::Ledger(LedgerError::InsufficientFunds {
            remaining: dec!(10),
            requested: dec!(20),
        });
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
    }
}
