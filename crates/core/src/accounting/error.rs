//! Accounting posting error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during journal preview and posting.
#[derive(Debug, Error)]
pub enum PostingError {
    /// The transaction is not in a postable state.
    #[error("Transaction is not postable: {0}")]
    InvalidState(&'static str),

    /// Already posted under a different reference.
    #[error("Transaction already posted under reference {existing_ref}")]
    Conflict {
        /// The reference it was posted under.
        existing_ref: String,
    },

    /// Another actor modified the transaction first.
    #[error("Version mismatch: expected {expected}, found {actual}")]
    VersionMismatch {
        /// Version the caller presented.
        expected: i32,
        /// Version currently on the row.
        actual: i32,
    },

    /// The snapshot failed validation and posting is refused.
    #[error("Journal snapshot is blocked and cannot be posted")]
    SnapshotBlocked,

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PostingError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidState(_) | Self::SnapshotBlocked => 400,
            Self::Conflict { .. } | Self::VersionMismatch { .. } => 409,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the machine-readable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict { .. } => "CONFLICT",
            Self::VersionMismatch { .. } => "VERSION_MISMATCH",
            Self::SnapshotBlocked => "SNAPSHOT_BLOCKED",
            Self::NotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
