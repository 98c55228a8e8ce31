//! Pure bin-distribution planner.
//!
//! Given a total adjustment quantity for one item and the ordered set of
//! bins the user selected, compute a per-bin adjustment plan that is
//! consistent with the item-level total and never drives a bin negative.
//! The planner has no side effects; persisting a plan is the adjustment
//! service's job.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::stock::AdjustmentMode;

/// Current quantity of one selected bin, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSnapshot {
    pub bin_id: Uuid,
    pub current_quantity: Decimal,
}

/// Planned change for one bin.
///
/// For REPLACE, `adjustment_quantity` is the absolute difference between
/// the bin's new target and its current quantity; the direction is
/// recoverable from `quantity_before`/`quantity_after`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BinAdjustment {
    pub bin_id: Uuid,
    #[schema(value_type = f64)]
    pub quantity_before: Decimal,
    #[schema(value_type = f64)]
    pub adjustment_quantity: Decimal,
    #[schema(value_type = f64)]
    pub quantity_after: Decimal,
}

/// Computes the per-bin plan for an adjustment.
///
/// * ADD: `quantity` is split as `floor(q/n)` per bin, with the first
///   `q mod n` bins (in selection order) receiving one extra unit.
/// * REMOVE: bins are drained greedily in selection order; a shortfall
///   across all selected bins fails with `InsufficientStock` and no plan.
/// * REPLACE: `quantity` is the new item-level total; per-bin targets use
///   the ADD remainder rule.
pub fn plan_distribution(
    mode: AdjustmentMode,
    quantity: Decimal,
    bins: &[BinSnapshot],
) -> Result<Vec<BinAdjustment>, ServiceError> {
    if bins.is_empty() {
        return Err(ServiceError::InvalidInput(
            "at least one bin must be selected".into(),
        ));
    }
    if quantity < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(format!(
            "adjustment quantity must not be negative (got {})",
            quantity
        )));
    }
    if let Some(bad) = bins.iter().find(|b| b.current_quantity < Decimal::ZERO) {
        return Err(ServiceError::InvalidInput(format!(
            "bin {} has negative current quantity {}",
            bad.bin_id, bad.current_quantity
        )));
    }

    match mode {
        AdjustmentMode::Add => plan_add(quantity, bins),
        AdjustmentMode::Remove => plan_remove(quantity, bins),
        AdjustmentMode::Replace => plan_replace(quantity, bins),
    }
}

fn plan_add(quantity: Decimal, bins: &[BinSnapshot]) -> Result<Vec<BinAdjustment>, ServiceError> {
    let shares = split_evenly(quantity, bins.len())?;
    Ok(bins
        .iter()
        .zip(shares)
        .map(|(bin, share)| BinAdjustment {
            bin_id: bin.bin_id,
            quantity_before: bin.current_quantity,
            adjustment_quantity: share,
            quantity_after: bin.current_quantity + share,
        })
        .collect())
}

fn plan_remove(
    quantity: Decimal,
    bins: &[BinSnapshot],
) -> Result<Vec<BinAdjustment>, ServiceError> {
    let available: Decimal = bins.iter().map(|b| b.current_quantity).sum();
    if available < quantity {
        return Err(ServiceError::InsufficientStock(format!(
            "requested {}, available {} across {} bins (short {})",
            quantity,
            available,
            bins.len(),
            quantity - available
        )));
    }

    let mut remaining = quantity;
    let mut plan = Vec::with_capacity(bins.len());
    for bin in bins {
        let take = remaining.min(bin.current_quantity);
        remaining -= take;
        plan.push(BinAdjustment {
            bin_id: bin.bin_id,
            quantity_before: bin.current_quantity,
            adjustment_quantity: take,
            quantity_after: bin.current_quantity - take,
        });
    }
    debug_assert_eq!(remaining, Decimal::ZERO);
    Ok(plan)
}

fn plan_replace(
    target: Decimal,
    bins: &[BinSnapshot],
) -> Result<Vec<BinAdjustment>, ServiceError> {
    let targets = split_evenly(target, bins.len())?;
    Ok(bins
        .iter()
        .zip(targets)
        .map(|(bin, bin_target)| BinAdjustment {
            bin_id: bin.bin_id,
            quantity_before: bin.current_quantity,
            adjustment_quantity: (bin_target - bin.current_quantity).abs(),
            quantity_after: bin_target,
        })
        .collect())
}

/// Splits `total` into `n` shares differing by at most one unit, with the
/// extra units assigned to the leading shares.
///
/// The remainder rule is only defined for whole-number totals; fractional
/// totals are accepted when `n == 1` (no split happens) and rejected
/// otherwise, since the source system left fractional-unit distribution
/// unspecified.
fn split_evenly(total: Decimal, n: usize) -> Result<Vec<Decimal>, ServiceError> {
    if n == 1 {
        return Ok(vec![total]);
    }
    if total.fract() != Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "fractional quantity {} cannot be split across {} bins",
            total, n
        )));
    }

    let n_dec = Decimal::from(n as u64);
    let base = (total / n_dec).floor();
    let remainder = (total - base * n_dec)
        .to_usize()
        .ok_or_else(|| ServiceError::InvalidInput(format!("quantity {} out of range", total)))?;

    Ok((0..n)
        .map(|i| {
            if i < remainder {
                base + Decimal::ONE
            } else {
                base
            }
        })
        .collect())
}
