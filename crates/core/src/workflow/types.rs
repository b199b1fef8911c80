//! Workflow domain types for the transaction approval ladder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status in the 4-level approval workflow.
///
/// Valid transitions:
/// - creation inserts at `PendingL1` (funds blocked in the same step)
/// - `PendingLk` → `PendingL(k+1)` on approval by level k (k = 1..3)
/// - `PendingL4` → `Approved` on level-4 approval
/// - `PendingLk` → `Approved` in one hop for the superuser level
/// - `PendingLk` → `Rejected` (terminal) or → `Draft` (returned to user)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Returned to the requester; can be resubmitted.
    Draft,
    /// Awaiting level-1 approval.
    PendingL1,
    /// Awaiting level-2 approval.
    PendingL2,
    /// Awaiting level-3 approval.
    PendingL3,
    /// Awaiting level-4 approval.
    PendingL4,
    /// Fully approved; ledger finalized (terminal).
    Approved,
    /// Rejected (terminal).
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingL1 => "pending_l1",
            Self::PendingL2 => "pending_l2",
            Self::PendingL3 => "pending_l3",
            Self::PendingL4 => "pending_l4",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    ///
    /// The legacy status `"pending"` (single-step admin approval from an
    /// earlier deployment) maps to `PendingL1`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" | "pending_l1" => Some(Self::PendingL1),
            "pending_l2" => Some(Self::PendingL2),
            "pending_l3" => Some(Self::PendingL3),
            "pending_l4" => Some(Self::PendingL4),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The approval level this status is waiting on, if any.
    #[must_use]
    pub fn pending_level(&self) -> Option<u8> {
        match self {
            Self::PendingL1 => Some(1),
            Self::PendingL2 => Some(2),
            Self::PendingL3 => Some(3),
            Self::PendingL4 => Some(4),
            _ => None,
        }
    }

    /// The pending status for a given ladder level.
    #[must_use]
    pub fn pending_at(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::PendingL1),
            2 => Some(Self::PendingL2),
            3 => Some(Self::PendingL3),
            4 => Some(Self::PendingL4),
            _ => None,
        }
    }

    /// Returns true for states no action can leave.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval level of a principal.
///
/// Levels 1 through 4 may each act only on the matching rung of the
/// ladder; the superuser level may act at any rung and collapses the
/// remainder of the ladder in a single approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    /// First-line approver.
    L1,
    /// Second-line approver.
    L2,
    /// Third-line approver.
    L3,
    /// Final approver.
    L4,
    /// Superuser; may act at any level.
    Admin,
}

impl AdminLevel {
    /// Numeric encoding used in the users table: 1..=4, 9 for superuser.
    #[must_use]
    pub const fn as_i16(&self) -> i16 {
        match self {
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
            Self::L4 => 4,
            Self::Admin => 9,
        }
    }

    /// Decodes the numeric level. Zero and unknown values have no
    /// approval authority and return `None`.
    #[must_use]
    pub const fn from_i16(level: i16) -> Option<Self> {
        match level {
            1 => Some(Self::L1),
            2 => Some(Self::L2),
            3 => Some(Self::L3),
            4 => Some(Self::L4),
            9 => Some(Self::Admin),
            _ => None,
        }
    }

    /// The ladder rung this level matches, or `None` for the superuser.
    #[must_use]
    pub const fn ladder_rung(&self) -> Option<u8> {
        match self {
            Self::L1 => Some(1),
            Self::L2 => Some(2),
            Self::L3 => Some(3),
            Self::L4 => Some(4),
            Self::Admin => None,
        }
    }

    /// Returns true for the superuser level.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L3 => write!(f, "L3"),
            Self::L4 => write!(f, "L4"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Action kinds recorded in the workflow log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// Creation or resubmission onto the ladder.
    Submit,
    /// An approval advanced the transaction one (or more) rungs.
    Approve,
    /// A terminal rejection.
    Reject,
    /// Returned to the requester as a draft.
    ReturnToUser,
}

impl WorkflowEvent {
    /// Returns the string representation of the event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ReturnToUser => "return_to_user",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::PendingL1,
            TransactionStatus::PendingL2,
            TransactionStatus::PendingL3,
            TransactionStatus::PendingL4,
            TransactionStatus::Approved,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_legacy_pending_maps_to_l1() {
        assert_eq!(
            TransactionStatus::parse("pending"),
            Some(TransactionStatus::PendingL1)
        );
        assert_eq!(
            TransactionStatus::parse("PENDING"),
            Some(TransactionStatus::PendingL1)
        );
    }

    #[test]
    fn test_pending_level() {
        assert_eq!(TransactionStatus::PendingL1.pending_level(), Some(1));
        assert_eq!(TransactionStatus::PendingL4.pending_level(), Some(4));
        assert_eq!(TransactionStatus::Draft.pending_level(), None);
        assert_eq!(TransactionStatus::Approved.pending_level(), None);
    }

    #[test]
    fn test_pending_at_inverts_pending_level() {
        for level in 1..=4u8 {
            let status = TransactionStatus::pending_at(level).unwrap();
            assert_eq!(status.pending_level(), Some(level));
        }
        assert_eq!(TransactionStatus::pending_at(0), None);
        assert_eq!(TransactionStatus::pending_at(5), None);
    }

    #[test]
    fn test_admin_level_numeric_codes() {
        assert_eq!(AdminLevel::from_i16(1), Some(AdminLevel::L1));
        assert_eq!(AdminLevel::from_i16(4), Some(AdminLevel::L4));
        assert_eq!(AdminLevel::from_i16(9), Some(AdminLevel::Admin));
        assert_eq!(AdminLevel::from_i16(0), None);
        assert_eq!(AdminLevel::from_i16(5), None);
        for level in [
            AdminLevel::L1,
            AdminLevel::L2,
            AdminLevel::L3,
            AdminLevel::L4,
            AdminLevel::Admin,
        ] {
            assert_eq!(AdminLevel::from_i16(level.as_i16()), Some(level));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(TransactionStatus::Approved.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
        assert!(!TransactionStatus::PendingL3.is_terminal());
        assert!(!TransactionStatus::Draft.is_terminal());
    }
}
