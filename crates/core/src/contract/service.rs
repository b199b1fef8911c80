//! State machine logic for the contract lifecycle.

use rust_decimal::Decimal;

use crate::contract::error::ContractError;
use crate::contract::types::ContractStatus;

/// Stateless service for contract transitions.
pub struct ContractService;

impl ContractService {
    /// Validates a draft before funds are reserved for it.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::NonPositiveAmount` when the total is not
    /// strictly positive.
    pub fn validate_draft(total_amount: Decimal) -> Result<(), ContractError> {
        if total_amount <= Decimal::ZERO {
            return Err(ContractError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Submits a draft for approval.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` unless the contract is
    /// in `Draft`.
    pub fn submit(current: ContractStatus) -> Result<ContractStatus, ContractError> {
        match current {
            ContractStatus::Draft => Ok(ContractStatus::PendingApproval),
            _ => Err(ContractError::InvalidTransition {
                from: current,
                action: "submit",
            }),
        }
    }

    /// Approves a submitted contract. The reservation is untouched:
    /// money stays blocked through execution.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` unless the contract is
    /// in `PendingApproval`.
    pub fn approve(current: ContractStatus) -> Result<ContractStatus, ContractError> {
        match current {
            ContractStatus::PendingApproval => Ok(ContractStatus::Approved),
            _ => Err(ContractError::InvalidTransition {
                from: current,
                action: "approve",
            }),
        }
    }

    /// Rejects a contract. The caller releases the still-unspent part of
    /// the reservation alongside this transition.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` unless the contract is
    /// in `Draft` or `PendingApproval`.
    pub fn reject(current: ContractStatus) -> Result<ContractStatus, ContractError> {
        match current {
            ContractStatus::Draft | ContractStatus::PendingApproval => {
                Ok(ContractStatus::Rejected)
            }
            _ => Err(ContractError::InvalidTransition {
                from: current,
                action: "reject",
            }),
        }
    }

    /// Status after a statement payment has brought the paid total to
    /// `paid_after` of `total`.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::InvalidTransition` when the contract is
    /// not payable.
    pub fn after_payment(
        current: ContractStatus,
        paid_after: Decimal,
        total: Decimal,
    ) -> Result<ContractStatus, ContractError> {
        if !current.is_payable() {
            return Err(ContractError::InvalidTransition {
                from: current,
                action: "pay against",
            });
        }

        Ok(if paid_after >= total {
            ContractStatus::Completed
        } else {
            ContractStatus::InProgress
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_happy_path() {
        assert!(ContractService::validate_draft(dec!(1000)).is_ok());
        let submitted = ContractService::submit(ContractStatus::Draft).unwrap();
        assert_eq!(submitted, ContractStatus::PendingApproval);
        let approved = ContractService::approve(submitted).unwrap();
        assert_eq!(approved, ContractStatus::Approved);
    }

    #[test]
    fn test_draft_requires_positive_total() {
        assert!(matches!(
            ContractService::validate_draft(dec!(0)),
            Err(ContractError::NonPositiveAmount)
        ));
        assert!(matches!(
            ContractService::validate_draft(dec!(-10)),
            Err(ContractError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_approve_requires_pending() {
        for status in [
            ContractStatus::Draft,
            ContractStatus::Approved,
            ContractStatus::Rejected,
        ] {
            assert!(ContractService::approve(status).is_err());
        }
    }

    #[test]
    fn test_reject_from_draft_or_pending_only() {
        assert!(ContractService::reject(ContractStatus::Draft).is_ok());
        assert!(ContractService::reject(ContractStatus::PendingApproval).is_ok());
        assert!(ContractService::reject(ContractStatus::Approved).is_err());
        assert!(ContractService::reject(ContractStatus::InProgress).is_err());
    }

    #[test]
    fn test_payment_moves_to_in_progress_then_completed() {
        let partial =
            ContractService::after_payment(ContractStatus::Approved, dec!(40), dec!(100)).unwrap();
        assert_eq!(partial, ContractStatus::InProgress);

        let full =
            ContractService::after_payment(ContractStatus::InProgress, dec!(100), dec!(100))
                .unwrap();
        assert_eq!(full, ContractStatus::Completed);
    }

    #[test]
    fn test_payment_requires_payable_status() {
        assert!(
            ContractService::after_payment(ContractStatus::Draft, dec!(10), dec!(100)).is_err()
        );
        assert!(
            ContractService::after_payment(ContractStatus::Rejected, dec!(10), dec!(100)).is_err()
        );
    }
}
