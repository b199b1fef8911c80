//! Contract domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract status.
///
/// Valid transitions:
/// - `Draft` → `PendingApproval` (submit)
/// - `PendingApproval` → `Approved` (approve)
/// - `Draft` / `PendingApproval` → `Rejected` (reject; releases the
///   reservation)
/// - `Approved` → `InProgress` (first statement payment)
/// - `InProgress` → `Completed` (paid amount reaches the total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Being drafted; funds already reserved.
    Draft,
    /// Submitted for approval.
    PendingApproval,
    /// Approved; execution may begin.
    Approved,
    /// At least one statement has been paid.
    InProgress,
    /// Fully paid out (terminal).
    Completed,
    /// Rejected; reservation released (terminal).
    Rejected,
}

impl ContractStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether statements of this contract may be paid.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::Approved | Self::InProgress)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for status in [
            ContractStatus::Draft,
            ContractStatus::PendingApproval,
            ContractStatus::Approved,
            ContractStatus::InProgress,
            ContractStatus::Completed,
            ContractStatus::Rejected,
        ] {
            assert_eq!(ContractStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContractStatus::parse("void"), None);
    }

    #[test]
    fn test_payable_states() {
        assert!(ContractStatus::Approved.is_payable());
        assert!(ContractStatus::InProgress.is_payable());
        assert!(!ContractStatus::Draft.is_payable());
        assert!(!ContractStatus::Completed.is_payable());
        assert!(!ContractStatus::Rejected.is_payable());
    }
}
