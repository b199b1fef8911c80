//! Progress statement domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress statement status.
///
/// Valid transitions: `Draft` → `Submitted` → `Approved` → `Paid`.
/// Only `pay` touches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    /// Being drafted.
    Draft,
    /// Submitted for review.
    Submitted,
    /// Approved for payment.
    Approved,
    /// Paid out (terminal).
    Paid,
}

impl StatementStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Paid => "paid",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated money figures of one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementAmounts {
    /// Gross claim.
    pub gross: Decimal,
    /// Deductions (retention, penalties, advances recovered).
    pub deductions: Decimal,
    /// Net payable: `gross - deductions`.
    pub net: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for status in [
            StatementStatus::Draft,
            StatementStatus::Submitted,
            StatementStatus::Approved,
            StatementStatus::Paid,
        ] {
            assert_eq!(StatementStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(StatementStatus::parse("settled"), None);
    }
}
