//! Budget ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::budget::types::LedgerOperation;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Requested reservation exceeds the remaining balance.
    ///
    /// Recoverable: the caller can reduce the amount or pick another
    /// budget row.
    #[error("Insufficient funds: remaining {remaining}, requested {requested}")]
    InsufficientFunds {
        /// Remaining balance at the time of the attempt.
        remaining: Decimal,
        /// Amount that was requested.
        requested: Decimal,
    },

    /// Release or confirm exceeds the blocked amount.
    ///
    /// Indicates a caller-side logic bug: spend must come out of a prior
    /// block, and nothing can be released that was never reserved.
    #[error("Cannot {operation} {requested}: only {blocked} is blocked")]
    InvalidOperation {
        /// The attempted operation.
        operation: LedgerOperation,
        /// Blocked amount at the time of the attempt.
        blocked: Decimal,
        /// Amount that was requested.
        requested: Decimal,
    },

    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Budget row not found.
    #[error("Budget row not found: {0}")]
    RowNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InsufficientFunds { .. } => 422,
            Self::InvalidOperation { .. } => 409,
            Self::NonPositiveAmount(_) => 400,
            Self::RowNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the machine-readable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidOperation { .. } => "INVALID_LEDGER_OPERATION",
            Self::NonPositiveAmount(_) => "INVALID_AMOUNT",
            Self::RowNotFound(_) => "BUDGET_ROW_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_carries_both_figures() {
        let err = LedgerError::InsufficientFunds {
            remaining: dec!(250),
            requested: dec!(400),
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
        let msg = err.to_string();
        assert!(msg.contains("250"));
        assert!(msg.contains("400"));
    }

    #[test]
    fn test_invalid_operation_names_the_operation() {
        let err = LedgerError::InvalidOperation {
            operation: LedgerOperation::Release,
            blocked: dec!(50),
            requested: dec!(100),
        };
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("RELEASE"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(LedgerError::RowNotFound(Uuid::nil()).status_code(), 404);
    }
}
