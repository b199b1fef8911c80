//! Journal snapshot construction.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::accounting::types::{
    ExpenseAccount, JournalLineDraft, JournalSide, JournalSnapshotDraft, ValidationStatus,
};

/// Account code used when the source budget row cannot supply one.
const UNASSIGNED_ACCOUNT: &str = "UNASSIGNED";

/// Builds immutable journal snapshots from approved transactions.
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Freezes exactly two lines for the transaction: a debit against
    /// the budget row's expense account and a credit against the
    /// configured bank account.
    ///
    /// A missing expense account degrades to `ValidationStatus::Warning`
    /// with a placeholder code; an unbalanced line set (impossible by
    /// construction, checked anyway) is `Blocked`.
    #[must_use]
    pub fn build(
        transaction_id: Uuid,
        amount: Decimal,
        expense: Option<&ExpenseAccount>,
        bank_account_code: &str,
        bank_account_name: &str,
    ) -> JournalSnapshotDraft {
        let (expense_code, expense_name, source_complete) = match expense {
            Some(account) => (account.code.clone(), account.name.clone(), true),
            None => (
                UNASSIGNED_ACCOUNT.to_string(),
                "Unassigned expense".to_string(),
                false,
            ),
        };

        let lines = vec![
            JournalLineDraft {
                line_no: 1,
                account_code: expense_code,
                account_name: expense_name,
                side: JournalSide::Debit,
                amount,
            },
            JournalLineDraft {
                line_no: 2,
                account_code: bank_account_code.to_string(),
                account_name: bank_account_name.to_string(),
                side: JournalSide::Credit,
                amount,
            },
        ];

        let total_debit: Decimal = lines
            .iter()
            .filter(|l| l.side == JournalSide::Debit)
            .map(|l| l.amount)
            .sum();
        let total_credit: Decimal = lines
            .iter()
            .filter(|l| l.side == JournalSide::Credit)
            .map(|l| l.amount)
            .sum();
        let is_balanced = total_debit == total_credit;

        let validation_status = if !is_balanced {
            ValidationStatus::Blocked
        } else if source_complete {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Warning
        };

        let content_hash = Self::hash_lines(transaction_id, &lines);

        JournalSnapshotDraft {
            transaction_id,
            lines,
            total_debit,
            total_credit,
            is_balanced,
            validation_status,
            content_hash,
        }
    }

    /// Content-addresses the line set. Any later edit to a stored line
    /// is detectable by recomputing this hash.
    #[must_use]
    pub fn hash_lines(transaction_id: Uuid, lines: &[JournalLineDraft]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(transaction_id.as_bytes());
        for line in lines {
            hasher.update(
                format!(
                    "\n{}|{}|{}|{}",
                    line.line_no,
                    line.account_code,
                    line.side.as_str(),
                    line.amount
                )
                .as_bytes(),
            );
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            use std::fmt::Write as _;
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expense() -> ExpenseAccount {
        ExpenseAccount {
            code: "10203040".to_string(),
            name: "Road maintenance".to_string(),
        }
    }

    #[test]
    fn test_two_lines_debit_then_credit() {
        let snapshot = SnapshotBuilder::build(
            Uuid::nil(),
            dec!(750),
            Some(&expense()),
            "1001",
            "Treasury",
        );

        assert_eq!(snapshot.lines.len(), 2);
        assert_eq!(snapshot.lines[0].side, JournalSide::Debit);
        assert_eq!(snapshot.lines[0].account_code, "10203040");
        assert_eq!(snapshot.lines[1].side, JournalSide::Credit);
        assert_eq!(snapshot.lines[1].account_code, "1001");
        assert_eq!(snapshot.total_debit, dec!(750));
        assert_eq!(snapshot.total_credit, dec!(750));
        assert!(snapshot.is_balanced);
        assert_eq!(snapshot.validation_status, ValidationStatus::Valid);
    }

    #[test]
    fn test_missing_expense_account_degrades_to_warning() {
        let snapshot = SnapshotBuilder::build(Uuid::nil(), dec!(100), None, "1001", "Treasury");
        assert_eq!(snapshot.validation_status, ValidationStatus::Warning);
        assert_eq!(snapshot.lines[0].account_code, "UNASSIGNED");
        assert!(snapshot.is_balanced);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let id = Uuid::new_v4();
        let a = SnapshotBuilder::build(id, dec!(100), Some(&expense()), "1001", "Treasury");
        let b = SnapshotBuilder::build(id, dec!(100), Some(&expense()), "1001", "Treasury");
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.content_hash.len(), 64);
    }

    #[test]
    fn test_hash_detects_tampering() {
        let id = Uuid::new_v4();
        let snapshot = SnapshotBuilder::build(id, dec!(100), Some(&expense()), "1001", "Treasury");

        let mut tampered = snapshot.lines.clone();
        tampered[0].amount = dec!(999);
        assert_ne!(
            SnapshotBuilder::hash_lines(id, &tampered),
            snapshot.content_hash
        );
    }

    #[test]
    fn test_hash_depends_on_transaction() {
        let a = SnapshotBuilder::build(Uuid::new_v4(), dec!(100), Some(&expense()), "1001", "T");
        let b = SnapshotBuilder::build(Uuid::new_v4(), dec!(100), Some(&expense()), "1001", "T");
        assert_ne!(a.content_hash, b.content_hash);
    }
}
