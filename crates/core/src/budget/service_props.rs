//! Property-based tests for the ledger arithmetic.
//!
//! The central property: starting from a consistent row, any sequence of
//! block/release/confirm calls that individually succeed leaves the row
//! consistent (`0 <= blocked + spent <= approved`), and a failed call
//! leaves the balances untouched.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::budget::service::LedgerService;
use crate::budget::types::{LedgerBalances, LedgerOperation};

/// Strategy for amounts between 0.01 and 10,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_operation() -> impl Strategy<Value = LedgerOperation> {
    prop_oneof![
        Just(LedgerOperation::Block),
        Just(LedgerOperation::Release),
        Just(LedgerOperation::Confirm),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any sequence of individually-successful operations preserves the
    /// ledger invariant, and `approved` never changes.
    #[test]
    fn prop_op_sequences_preserve_invariant(
        approved in (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        ops in prop::collection::vec((arb_operation(), arb_amount()), 0..64),
    ) {
        let mut balances = LedgerBalances::approved(approved);

        for (op, amount) in ops {
            match LedgerService::apply(balances, op, amount) {
                Ok(next) => {
                    prop_assert!(next.is_consistent(),
                        "inconsistent after {op}: {next:?}");
                    prop_assert_eq!(next.approved, approved);
                    balances = next;
                }
                Err(_) => {
                    // Failed preconditions must not change state; `balances`
                    // was passed by value, so nothing to roll back. Just
                    // re-check consistency held.
                    prop_assert!(balances.is_consistent());
                }
            }
        }
    }

    /// Block then release of the same amount is an exact round trip.
    #[test]
    fn prop_block_release_round_trip(
        approved in (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        amount in arb_amount(),
    ) {
        let before = LedgerBalances::approved(approved);
        if let Ok(blocked) = LedgerService::block(before, amount) {
            let after = LedgerService::release(blocked, amount).unwrap();
            prop_assert_eq!(after, before);
        }
    }

    /// Confirm never changes `blocked + spent`.
    #[test]
    fn prop_confirm_preserves_committed(
        approved in (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        reserve in arb_amount(),
        confirm in arb_amount(),
    ) {
        let start = LedgerBalances::approved(approved);
        if let Ok(blocked) = LedgerService::block(start, reserve)
            && let Ok(after) = LedgerService::confirm(blocked, confirm)
        {
            prop_assert_eq!(after.committed(), blocked.committed());
        }
    }

    /// A block that fails reports the true remaining balance.
    #[test]
    fn prop_insufficient_funds_reports_remaining(
        approved in (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        requested in arb_amount(),
    ) {
        let balances = LedgerBalances::approved(approved);
        match LedgerService::block(balances, requested) {
            Ok(_) => prop_assert!(requested <= approved),
            Err(crate::budget::LedgerError::InsufficientFunds { remaining, requested: r }) => {
                prop_assert_eq!(remaining, approved);
                prop_assert_eq!(r, requested);
                prop_assert!(requested > approved);
            }
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }
}
