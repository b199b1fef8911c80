//! Accounting domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Accounting status of a transaction, orthogonal to the workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingStatus {
    /// Snapshot exists; awaiting posting.
    ReadyToPost,
    /// Posted to the journal (terminal).
    Posted,
}

impl AccountingStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadyToPost => "ready_to_post",
            Self::Posted => "posted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ready_to_post" => Some(Self::ReadyToPost),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }
}

impl fmt::Display for AccountingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationStatus {
    /// Balanced, complete source data.
    Valid,
    /// Usable but the source budget row was missing or incomplete.
    Warning,
    /// Unbalanced; posting is refused.
    Blocked,
}

impl ValidationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Warning => "WARNING",
            Self::Blocked => "BLOCKED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "VALID" => Some(Self::Valid),
            "WARNING" => Some(Self::Warning),
            "BLOCKED" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Which side of the journal a line sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalSide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl JournalSide {
    /// Returns the string representation of the side.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }

    /// Parses a side from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DEBIT" => Some(Self::Debit),
            "CREDIT" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// Expense account derived from a budget row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseAccount {
    /// Account code (the budget coding).
    pub code: String,
    /// Human-readable account name.
    pub name: String,
}

/// One journal line before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineDraft {
    /// 1-based position within the snapshot.
    pub line_no: i16,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Debit or credit.
    pub side: JournalSide,
    /// Line amount.
    pub amount: Decimal,
}

/// A journal snapshot before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSnapshotDraft {
    /// Source transaction.
    pub transaction_id: Uuid,
    /// The frozen lines.
    pub lines: Vec<JournalLineDraft>,
    /// Sum of debit lines.
    pub total_debit: Decimal,
    /// Sum of credit lines.
    pub total_credit: Decimal,
    /// `total_debit == total_credit`.
    pub is_balanced: bool,
    /// Validation outcome.
    pub validation_status: ValidationStatus,
    /// SHA-256 over the canonical line serialization, hex-encoded.
    pub content_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounting_status_round_trip() {
        assert_eq!(
            AccountingStatus::parse("ready_to_post"),
            Some(AccountingStatus::ReadyToPost)
        );
        assert_eq!(AccountingStatus::parse("POSTED"), Some(AccountingStatus::Posted));
        assert_eq!(AccountingStatus::parse("draft"), None);
    }

    #[test]
    fn test_validation_status_round_trip() {
        for status in [
            ValidationStatus::Valid,
            ValidationStatus::Warning,
            ValidationStatus::Blocked,
        ] {
            assert_eq!(ValidationStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_side_round_trip() {
        assert_eq!(JournalSide::parse("debit"), Some(JournalSide::Debit));
        assert_eq!(JournalSide::parse("CREDIT"), Some(JournalSide::Credit));
        assert_eq!(JournalSide::parse("both"), None);
    }
}
