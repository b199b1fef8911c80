//! Progress statement error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::budget::LedgerError;
use crate::contract::ContractError;
use crate::statement::types::StatementStatus;

/// Errors that can occur during statement operations.
#[derive(Debug, Error)]
pub enum StatementError {
    /// Cumulative net across the contract's statements would exceed the
    /// contract total.
    ///
    /// Recoverable: the user can reduce the claim.
    #[error("Over-payment: cumulative {cumulative} exceeds contract total {ceiling}")]
    OverPayment {
        /// The contract total.
        ceiling: Decimal,
        /// Cumulative net including the attempted statement.
        cumulative: Decimal,
    },

    /// The requested action is not valid from the current status.
    #[error("Cannot {action} a statement in status {from}")]
    InvalidTransition {
        /// The current status.
        from: StatementStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Gross/deduction figures are malformed.
    #[error("Invalid statement amounts: {0}")]
    InvalidAmounts(&'static str),

    /// Statement not found.
    #[error("Statement not found: {0}")]
    NotFound(Uuid),

    /// The owning contract refused the operation.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// A ledger side-effect failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl StatementError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::OverPayment { .. } => 422,
            Self::InvalidTransition { .. } => 409,
            Self::InvalidAmounts(_) => 400,
            Self::NotFound(_) => 404,
            Self::Contract(e) => e.status_code(),
            Self::Ledger(e) => e.status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns the machine-readable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::OverPayment { .. } => "OVER_PAYMENT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidAmounts(_) => "INVALID_AMOUNTS",
            Self::NotFound(_) => "STATEMENT_NOT_FOUND",
            Self::Contract(e) => e.error_code(),
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
    fn test_over_payment_is_422() {
        let err = StatementError::OverPayment {
            ceiling: dec!(100),
            cumulative: dec!(110),
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "OVER_PAYMENT");
    }

    #[test]
    fn test_ledger_errors_pass_through() {
        let err = StatementError::Ledger(LedgerError::InvalidOperation {
            operation: crate::budget::LedgerOperation::Confirm,
            blocked: dec!(0),
            requested: dec!(10),
        });
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_LEDGER_OPERATION");
    }
}
