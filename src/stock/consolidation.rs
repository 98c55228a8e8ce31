//! Client-facing consolidation of inventory rows.
//!
//! Several inventory records can represent the same logical stock position
//! (same product, bin, status, unit, and color). The consolidated view sums
//! their quantities and keeps the underlying row ids so audit lookups can
//! reach the source records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::inventory_record;

/// Grouping key for a logical stock position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: Uuid,
    pub bin_id: Uuid,
    pub status: String,
    pub unit: String,
    pub color: Option<String>,
}

/// One consolidated stock position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsolidatedStock {
    pub product_id: Uuid,
    pub bin_id: Uuid,
    pub status: String,
    pub unit: String,
    pub color: Option<String>,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    /// Ids of the underlying inventory rows, in input order.
    pub record_ids: Vec<Uuid>,
}

impl ConsolidatedStock {
    /// Grouping key of this consolidated position.
    pub fn key(&self) -> StockKey {
        StockKey {
            product_id: self.product_id,
            bin_id: self.bin_id,
            status: self.status.clone(),
            unit: self.unit.clone(),
            color: self.color.clone(),
        }
    }
}

/// Groups rows sharing (product, bin, status, unit, color), summing
/// quantities. Output order is first-seen input order; the set of
/// consolidated rows is independent of input order.
pub fn consolidate(records: &[inventory_record::Model]) -> Vec<ConsolidatedStock> {
    let mut index: HashMap<StockKey, usize> = HashMap::new();
    let mut out: Vec<ConsolidatedStock> = Vec::new();

    for record in records {
        let key = StockKey {
            product_id: record.product_id,
            bin_id: record.bin_id,
            status: record.status.clone(),
            unit: record.unit.clone(),
            color: record.color.clone(),
        };

        match index.get(&key) {
            Some(&i) => {
                out[i].quantity += record.quantity;
                out[i].record_ids.push(record.id);
            }
            None => {
                index.insert(key, out.len());
                out.push(ConsolidatedStock {
                    product_id: record.product_id,
                    bin_id: record.bin_id,
                    status: record.status.clone(),
                    unit: record.unit.clone(),
                    color: record.color.clone(),
                    quantity: record.quantity,
                    record_ids: vec![record.id],
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record(
        product_id: Uuid,
        bin_id: Uuid,
        status: &str,
        unit: &str,
        color: Option<&str>,
        quantity: Decimal,
    ) -> inventory_record::Model {
        inventory_record::Model {
            id: Uuid::new_v4(),
            product_id,
            bin_id,
            status: status.to_string(),
            quantity,
            unit: unit.to_string(),
            color: color.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn rows_with_same_key_merge() {
        let product = Uuid::new_v4();
        let bin = Uuid::new_v4();
        let a = record(product, bin, "IN_STORAGE", "pcs", Some("blue"), dec!(4));
        let b = record(product, bin, "IN_STORAGE", "pcs", Some("blue"), dec!(6));

        let merged = consolidate(&[a.clone(), b.clone()]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].quantity, dec!(10));
        assert_eq!(merged[0].record_ids, vec![a.id, b.id]);
    }

    #[test]
    fn grouping_is_commutative() {
        let product = Uuid::new_v4();
        let bin_a = Uuid::new_v4();
        let bin_b = Uuid::new_v4();
        let rows = vec![
            record(product, bin_a, "IN_STORAGE", "pcs", None, dec!(1)),
            record(product, bin_b, "IN_STORAGE", "pcs", None, dec!(2)),
            record(product, bin_a, "IN_STORAGE", "pcs", None, dec!(3)),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let mut forward = consolidate(&rows);
        let mut backward = consolidate(&reversed);
        for group in [&mut forward, &mut backward] {
            group.sort_by_key(|c| c.bin_id);
            for c in group.iter_mut() {
                c.record_ids.sort();
            }
        }
        assert_eq!(forward, backward);
    }

    #[test]
    fn differing_color_stays_separate() {
        let product = Uuid::new_v4();
        let bin = Uuid::new_v4();
        let rows = vec![
            record(product, bin, "IN_STORAGE", "m", Some("red"), dec!(2.5)),
            record(product, bin, "IN_STORAGE", "m", Some("blue"), dec!(2.5)),
        ];
        assert_eq!(consolidate(&rows).len(), 2);
    }

    #[test]
    fn consolidation_is_idempotent() {
        let product = Uuid::new_v4();
        let bin = Uuid::new_v4();
        let rows = vec![
            record(product, bin, "RECEIVED", "pcs", None, dec!(4)),
            record(product, bin, "RECEIVED", "pcs", None, dec!(6)),
        ];
        let once = consolidate(&rows);

        // Re-feeding the consolidated quantity as a single row must not
        // change the totals.
        let again = consolidate(&[record(product, bin, "RECEIVED", "pcs", None, once[0].quantity)]);
        assert_eq!(again[0].quantity, dec!(10));
        assert_eq!(once[0].key(), again[0].key());
    }
}
