//! Property-based tests for the bin distribution planner.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rust_decimal::Decimal;
use uuid::Uuid;

use warehouse_api::errors::ServiceError;
use warehouse_api::stock::distribution::{plan_distribution, BinSnapshot};
use warehouse_api::stock::AdjustmentMode;

fn bins_strategy() -> impl Strategy<Value = Vec<BinSnapshot>> {
    prop::collection::vec(0u32..10_000, 1..12).prop_map(|quantities| {
        quantities
            .into_iter()
            .map(|q| BinSnapshot {
                bin_id: Uuid::new_v4(),
                current_quantity: Decimal::from(q),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn add_conserves_the_total(bins in bins_strategy(), quantity in 0u32..100_000) {
        let quantity = Decimal::from(quantity);
        let plan = plan_distribution(AdjustmentMode::Add, quantity, &bins).unwrap();

        let allocated: Decimal = plan.iter().map(|p| p.adjustment_quantity).sum();
        prop_assert_eq!(allocated, quantity);
        for step in &plan {
            prop_assert_eq!(step.quantity_after, step.quantity_before + step.adjustment_quantity);
        }
    }

    #[test]
    fn add_shares_differ_by_at_most_one(bins in bins_strategy(), quantity in 0u32..100_000) {
        let plan = plan_distribution(AdjustmentMode::Add, Decimal::from(quantity), &bins).unwrap();

        let max = plan.iter().map(|p| p.adjustment_quantity).max().unwrap();
        let min = plan.iter().map(|p| p.adjustment_quantity).min().unwrap();
        prop_assert!(max - min <= Decimal::ONE);

        // Extra units go to the leading bins, so shares never increase
        // along the selection order.
        for pair in plan.windows(2) {
            prop_assert!(pair[0].adjustment_quantity >= pair[1].adjustment_quantity);
        }
    }

    #[test]
    fn remove_conserves_or_fails_cleanly(bins in bins_strategy(), quantity in 0u32..100_000) {
        let quantity = Decimal::from(quantity);
        let available: Decimal = bins.iter().map(|b| b.current_quantity).sum();

        match plan_distribution(AdjustmentMode::Remove, quantity, &bins) {
            Ok(plan) => {
                prop_assert!(available >= quantity);
                let removed: Decimal = plan.iter().map(|p| p.adjustment_quantity).sum();
                prop_assert_eq!(removed, quantity);
                for step in &plan {
                    prop_assert!(step.quantity_after >= Decimal::ZERO);
                }
            }
            Err(ServiceError::InsufficientStock(_)) => {
                prop_assert!(available < quantity);
            }
            Err(other) => return Err(TestCaseError::fail(format!("unexpected error: {}", other))),
        }
    }

    #[test]
    fn replace_hits_the_target_total(bins in bins_strategy(), target in 0u32..100_000) {
        let target = Decimal::from(target);
        let plan = plan_distribution(AdjustmentMode::Replace, target, &bins).unwrap();

        let after: Decimal = plan.iter().map(|p| p.quantity_after).sum();
        prop_assert_eq!(after, target);
        for step in &plan {
            prop_assert!(step.adjustment_quantity >= Decimal::ZERO);
            prop_assert_eq!(
                step.adjustment_quantity,
                (step.quantity_after - step.quantity_before).abs()
            );
        }
    }

    #[test]
    fn planning_never_mutates_its_input(bins in bins_strategy(), quantity in 0u32..100_000) {
        let before = bins.clone();
        let _ = plan_distribution(AdjustmentMode::Add, Decimal::from(quantity), &bins);
        let _ = plan_distribution(AdjustmentMode::Remove, Decimal::from(quantity), &bins);
        prop_assert_eq!(bins, before);
    }
}
