//! Pure arithmetic for the three ledger mutations.
//!
//! Each function takes the balances read under the row lock and returns
//! the balances to write back, or an error with no state change. The
//! separation of BLOCK (reservation at request time) from CONFIRM
//! (realization at payment time) lets concurrent requests see a shrinking
//! remaining figure immediately while deferring the irreversible spent
//! bookkeeping until money actually moves.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{LedgerBalances, LedgerOperation};

/// Stateless service computing ledger mutations.
pub struct LedgerService;

impl LedgerService {
    /// Reserves `amount` against the row.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`.
    /// - `LedgerError::InsufficientFunds` if `amount` exceeds the
    ///   remaining balance.
    pub fn block(
        balances: LedgerBalances,
        amount: Decimal,
    ) -> Result<LedgerBalances, LedgerError> {
        Self::require_positive(amount)?;

        let remaining = balances.remaining();
        if amount > remaining {
            return Err(LedgerError::InsufficientFunds {
                remaining,
                requested: amount,
            });
        }

        Ok(LedgerBalances {
            blocked: balances.blocked + amount,
            ..balances
        })
    }

    /// Returns `amount` of a reservation to the available pool.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`.
    /// - `LedgerError::InvalidOperation` if `amount` exceeds the blocked
    ///   amount.
    pub fn release(
        balances: LedgerBalances,
        amount: Decimal,
    ) -> Result<LedgerBalances, LedgerError> {
        Self::require_positive(amount)?;
        Self::require_blocked(balances, amount, LedgerOperation::Release)?;

        Ok(LedgerBalances {
            blocked: balances.blocked - amount,
            ..balances
        })
    }

    /// Converts `amount` of a reservation into permanent expenditure.
    ///
    /// `blocked + spent` is unchanged: this reclassifies money, it does
    /// not authorize new spend.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`.
    /// - `LedgerError::InvalidOperation` if `amount` exceeds the blocked
    ///   amount (no direct spend without a prior reservation).
    pub fn confirm(
        balances: LedgerBalances,
        amount: Decimal,
    ) -> Result<LedgerBalances, LedgerError> {
        Self::require_positive(amount)?;
        Self::require_blocked(balances, amount, LedgerOperation::Confirm)?;

        Ok(LedgerBalances {
            blocked: balances.blocked - amount,
            spent: balances.spent + amount,
            ..balances
        })
    }

    /// Applies any operation by kind. Used by replay/import tooling.
    ///
    /// # Errors
    ///
    /// Propagates the underlying operation's error.
    pub fn apply(
        balances: LedgerBalances,
        operation: LedgerOperation,
        amount: Decimal,
    ) -> Result<LedgerBalances, LedgerError> {
        match operation {
            LedgerOperation::Block => Self::block(balances, amount),
            LedgerOperation::Release => Self::release(balances, amount),
            LedgerOperation::Confirm => Self::confirm(balances, amount),
        }
    }

    fn require_positive(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        Ok(())
    }

    fn require_blocked(
        balances: LedgerBalances,
        amount: Decimal,
        operation: LedgerOperation,
    ) -> Result<(), LedgerError> {
        if amount > balances.blocked {
            return Err(LedgerError::InvalidOperation {
                operation,
                blocked: balances.blocked,
                requested: amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(approved: Decimal, blocked: Decimal, spent: Decimal) -> LedgerBalances {
        LedgerBalances {
            approved,
            blocked,
            spent,
        }
    }

    #[test]
    fn test_block_moves_remaining_to_blocked() {
        let after = LedgerService::block(row(dec!(1000), dec!(0), dec!(0)), dec!(500)).unwrap();
        assert_eq!(after.blocked, dec!(500));
        assert_eq!(after.remaining(), dec!(500));
    }

    #[test]
    fn test_block_whole_remaining_succeeds() {
        let after = LedgerService::block(row(dec!(1000), dec!(300), dec!(200)), dec!(500)).unwrap();
        assert_eq!(after.remaining(), dec!(0));
        assert!(after.is_consistent());
    }

    #[test]
    fn test_block_over_remaining_fails_without_change() {
        let before = row(dec!(1000), dec!(300), dec!(200));
        let err = LedgerService::block(before, dec!(501)).unwrap_err();
        match err {
            LedgerError::InsufficientFunds {
                remaining,
                requested,
            } => {
                assert_eq!(remaining, dec!(500));
                assert_eq!(requested, dec!(501));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_block_rejects_zero_and_negative() {
        let before = row(dec!(1000), dec!(0), dec!(0));
        assert!(matches!(
            LedgerService::block(before, dec!(0)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            LedgerService::block(before, dec!(-5)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_release_round_trip_restores_balances() {
        let before = row(dec!(1000), dec!(100), dec!(40));
        let blocked = LedgerService::block(before, dec!(100)).unwrap();
        let after = LedgerService::release(blocked, dec!(100)).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_release_more_than_blocked_fails() {
        let err =
            LedgerService::release(row(dec!(1000), dec!(50), dec!(0)), dec!(100)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidOperation {
                operation: LedgerOperation::Release,
                ..
            }
        ));
    }

    #[test]
    fn test_confirm_reclassifies_without_changing_committed() {
        let before = row(dec!(1000), dec!(500), dec!(0));
        let after = LedgerService::confirm(before, dec!(500)).unwrap();
        assert_eq!(after.blocked, dec!(0));
        assert_eq!(after.spent, dec!(500));
        assert_eq!(after.committed(), before.committed());
        assert_eq!(after.remaining(), dec!(500));
    }

    #[test]
    fn test_confirm_without_reservation_fails() {
        let err =
            LedgerService::confirm(row(dec!(1000), dec!(0), dec!(0)), dec!(100)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidOperation {
                operation: LedgerOperation::Confirm,
                ..
            }
        ));
    }

    #[test]
    fn test_spec_scenario() {
        // approved 1000, blocked 0, spent 0
        let mut balances = LedgerBalances::approved(dec!(1000));

        balances = LedgerService::block(balances, dec!(500)).unwrap();
        assert_eq!(balances.blocked, dec!(500));
        assert_eq!(balances.remaining(), dec!(500));

        balances = LedgerService::confirm(balances, dec!(500)).unwrap();
        assert_eq!(balances.blocked, dec!(0));
        assert_eq!(balances.spent, dec!(500));
        assert_eq!(balances.remaining(), dec!(500));

        // release 100 on a row with blocked 50 fails
        let small = row(dec!(1000), dec!(50), dec!(0));
        assert!(LedgerService::release(small, dec!(100)).is_err());
    }
}
