//! Contract error types.

use thiserror::Error;
use uuid::Uuid;

use crate::budget::LedgerError;
use crate::contract::types::ContractStatus;

/// Errors that can occur during contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The requested action is not valid from the current status.
    #[error("Cannot {action} a contract in status {from}")]
    InvalidTransition {
        /// The current status.
        from: ContractStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Contract amount must be strictly positive.
    #[error("Contract amount must be positive")]
    NonPositiveAmount,

    /// Contract number already in use.
    #[error("Contract number already exists: {0}")]
    DuplicateNumber(String),

    /// The contractor is unknown or not in good standing.
    #[error("Contractor {0} is not eligible")]
    ContractorNotEligible(String),

    /// Contract not found.
    #[error("Contract not found: {0}")]
    NotFound(Uuid),

    /// A ledger side-effect failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ContractError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::DuplicateNumber(_) => 409,
            Self::NonPositiveAmount => 400,
            Self::ContractorNotEligible(_) => 422,
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
            Self::NonPositiveAmount => "INVALID_AMOUNT",
            Self::DuplicateNumber(_) => "DUPLICATE_CONTRACT_NUMBER",
            Self::ContractorNotEligible(_) => "CONTRACTOR_NOT_ELIGIBLE",
            Self::NotFound(_) => "CONTRACT_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
