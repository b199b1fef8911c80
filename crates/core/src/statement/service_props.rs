//! Property-based tests for the over-payment ceiling.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::statement::error::StatementError;
use crate::statement::service::StatementService;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Feeding any sequence of claims through the ceiling check never
    /// lets the accepted cumulative exceed the contract total.
    #[test]
    fn prop_cumulative_never_exceeds_total(
        total in (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)),
        claims in prop::collection::vec(arb_amount(), 0..32),
    ) {
        let mut cumulative = Decimal::ZERO;

        for net in claims {
            match StatementService::check_ceiling(cumulative, net, total) {
                Ok(next) => {
                    prop_assert!(next <= total);
                    cumulative = next;
                }
                Err(StatementError::OverPayment { ceiling, cumulative: attempted }) => {
                    prop_assert_eq!(ceiling, total);
                    prop_assert!(attempted > total);
                    // Rejected claim leaves the accepted cumulative alone.
                }
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
        }

        prop_assert!(cumulative <= total);
    }

    /// Derived net always equals gross minus deductions when accepted.
    #[test]
    fn prop_net_derivation(gross in arb_amount(), deductions in arb_amount()) {
        if let Ok(amounts) = StatementService::amounts(gross, deductions) {
            prop_assert_eq!(amounts.net, gross - deductions);
            prop_assert!(amounts.net > Decimal::ZERO);
        } else {
            prop_assert!(deductions >= gross);
        }
    }
}
