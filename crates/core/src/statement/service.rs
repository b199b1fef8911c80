//! Statement lifecycle and the over-payment ceiling.

use rust_decimal::Decimal;

use crate::statement::error::StatementError;
use crate::statement::types::{StatementAmounts, StatementStatus};

/// Stateless service for statement transitions and money checks.
pub struct StatementService;

impl StatementService {
    /// Validates gross/deduction figures and derives the net amount.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidAmounts` when any figure is
    /// negative, deductions exceed gross, or the net comes out zero.
    pub fn amounts(
        gross: Decimal,
        deductions: Decimal,
    ) -> Result<StatementAmounts, StatementError> {
        if gross <= Decimal::ZERO {
            return Err(StatementError::InvalidAmounts("gross must be positive"));
        }
        if deductions < Decimal::ZERO {
            return Err(StatementError::InvalidAmounts(
                "deductions cannot be negative",
            ));
        }
        if deductions >= gross {
            return Err(StatementError::InvalidAmounts(
                "deductions must leave a positive net",
            ));
        }

        Ok(StatementAmounts {
            gross,
            deductions,
            net: gross - deductions,
        })
    }

    /// Enforces the contract ceiling: prior cumulative net plus this
    /// statement's net must not exceed the contract total. Returns the
    /// new cumulative figure.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::OverPayment` when the ceiling would be
    /// breached.
    pub fn check_ceiling(
        prior_cumulative: Decimal,
        net: Decimal,
        contract_total: Decimal,
    ) -> Result<Decimal, StatementError> {
        let cumulative = prior_cumulative + net;
        if cumulative > contract_total {
            return Err(StatementError::OverPayment {
                ceiling: contract_total,
                cumulative,
            });
        }
        Ok(cumulative)
    }

    /// Submits a draft statement.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidTransition` unless in `Draft`.
    pub fn submit(current: StatementStatus) -> Result<StatementStatus, StatementError> {
        Self::step(current, StatementStatus::Draft, StatementStatus::Submitted, "submit")
    }

    /// Approves a submitted statement.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidTransition` unless in `Submitted`.
    pub fn approve(current: StatementStatus) -> Result<StatementStatus, StatementError> {
        Self::step(
            current,
            StatementStatus::Submitted,
            StatementStatus::Approved,
            "approve",
        )
    }

    /// Pays an approved statement. The caller converts the contract's
    /// reservation into spend alongside this transition.
    ///
    /// # Errors
    ///
    /// Returns `StatementError::InvalidTransition` unless in `Approved`.
    pub fn pay(current: StatementStatus) -> Result<StatementStatus, StatementError> {
        Self::step(current, StatementStatus::Approved, StatementStatus::Paid, "pay")
    }

    fn step(
        current: StatementStatus,
        expected: StatementStatus,
        next: StatementStatus,
        action: &'static str,
    ) -> Result<StatementStatus, StatementError> {
        if current == expected {
            Ok(next)
        } else {
            Err(StatementError::InvalidTransition {
                from: current,
                action,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_net_is_gross_minus_deductions() {
        let amounts = StatementService::amounts(dec!(100), dec!(12.5)).unwrap();
        assert_eq!(amounts.net, dec!(87.5));
    }

    #[test]
    fn test_amount_validation() {
        assert!(StatementService::amounts(dec!(0), dec!(0)).is_err());
        assert!(StatementService::amounts(dec!(-5), dec!(0)).is_err());
        assert!(StatementService::amounts(dec!(100), dec!(-1)).is_err());
        assert!(StatementService::amounts(dec!(100), dec!(100)).is_err());
        assert!(StatementService::amounts(dec!(100), dec!(0)).is_ok());
    }

    #[test]
    fn test_ceiling_sixty_then_fifty_fails() {
        // contract total 100: statements 60 then 50 must fail
        let after_first = StatementService::check_ceiling(dec!(0), dec!(60), dec!(100)).unwrap();
        assert_eq!(after_first, dec!(60));

        let err = StatementService::check_ceiling(after_first, dec!(50), dec!(100)).unwrap_err();
        match err {
            StatementError::OverPayment { ceiling, cumulative } => {
                assert_eq!(ceiling, dec!(100));
                assert_eq!(cumulative, dec!(110));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ceiling_sixty_then_forty_succeeds() {
        let after_first = StatementService::check_ceiling(dec!(0), dec!(60), dec!(100)).unwrap();
        let after_second =
            StatementService::check_ceiling(after_first, dec!(40), dec!(100)).unwrap();
        assert_eq!(after_second, dec!(100));
    }

    #[test]
    fn test_lifecycle_order() {
        let submitted = StatementService::submit(StatementStatus::Draft).unwrap();
        let approved = StatementService::approve(submitted).unwrap();
        let paid = StatementService::pay(approved).unwrap();
        assert_eq!(paid, StatementStatus::Paid);
    }

    #[test]
    fn test_out_of_order_transitions_fail() {
        assert!(StatementService::approve(StatementStatus::Draft).is_err());
        assert!(StatementService::pay(StatementStatus::Submitted).is_err());
        assert!(StatementService::submit(StatementStatus::Paid).is_err());
        assert!(StatementService::pay(StatementStatus::Paid).is_err());
    }
}
