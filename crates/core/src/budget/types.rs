//! Budget ledger value types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three balances of one budget row.
///
/// `remaining = approved - blocked - spent` is always derived, never
/// stored. The invariant `0 <= blocked + spent <= approved` holds at rest;
/// every mutation in [`super::LedgerService`] preserves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBalances {
    /// Total amount approved for the fiscal year.
    pub approved: Decimal,
    /// Amount reserved but not yet spent.
    pub blocked: Decimal,
    /// Amount permanently spent.
    pub spent: Decimal,
}

impl LedgerBalances {
    /// Creates balances with nothing blocked or spent.
    #[must_use]
    pub fn approved(approved: Decimal) -> Self {
        Self {
            approved,
            blocked: Decimal::ZERO,
            spent: Decimal::ZERO,
        }
    }

    /// The only amount available for new reservations.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.approved - self.blocked - self.spent
    }

    /// Amount committed one way or the other (reserved or spent).
    #[must_use]
    pub fn committed(&self) -> Decimal {
        self.blocked + self.spent
    }

    /// Whether the ledger invariant holds.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.blocked >= Decimal::ZERO
            && self.spent >= Decimal::ZERO
            && self.committed() <= self.approved
    }
}

/// The kind of ledger mutation, as recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LedgerOperation {
    /// Reserve funds against the row.
    Block,
    /// Return a reservation to the available pool.
    Release,
    /// Convert a reservation into permanent expenditure.
    Confirm,
}

impl LedgerOperation {
    /// Returns the string representation of the operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "BLOCK",
            Self::Release => "RELEASE",
            Self::Confirm => "CONFIRM",
        }
    }

    /// Parses an operation from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BLOCK" => Some(Self::Block),
            "RELEASE" => Some(Self::Release),
            "CONFIRM" => Some(Self::Confirm),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_remaining_is_derived() {
        let balances = LedgerBalances {
            approved: dec!(1000),
            blocked: dec!(300),
            spent: dec!(200),
        };
        assert_eq!(balances.remaining(), dec!(500));
        assert_eq!(balances.committed(), dec!(500));
        assert!(balances.is_consistent());
    }

    #[test]
    fn test_overcommitted_is_inconsistent() {
        let balances = LedgerBalances {
            approved: dec!(100),
            blocked: dec!(80),
            spent: dec!(30),
        };
        assert!(!balances.is_consistent());
    }

    #[test]
    fn test_operation_round_trip() {
        for op in [
            LedgerOperation::Block,
            LedgerOperation::Release,
            LedgerOperation::Confirm,
        ] {
            assert_eq!(LedgerOperation::parse(op.as_str()), Some(op));
        }
        assert_eq!(LedgerOperation::parse("block"), Some(LedgerOperation::Block));
        assert_eq!(LedgerOperation::parse("SPEND"), None);
    }
}
