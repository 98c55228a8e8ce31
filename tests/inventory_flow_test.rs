//! End-to-end inventory flow: receive, put away, adjust, audit.

mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use warehouse_api::entities::{inventory_adjustment, inventory_record};
use warehouse_api::errors::ServiceError;
use warehouse_api::services::adjustments::{AdjustStockRequest, AdjustmentService};
use warehouse_api::services::inventory::{InventoryService, ReceiveStockRequest, StockFilter};
use warehouse_api::stock::{AdjustmentMode, StockStatus};

use common::{seed_product, seed_warehouse, test_db, test_events, test_feed};

async fn setup() -> (
    std::sync::Arc<warehouse_api::db::DbPool>,
    InventoryService,
    AdjustmentService,
    common::SeededWarehouse,
    Uuid,
) {
    let db = test_db().await;
    let events = test_events();
    let feed = test_feed();
    let inventory = InventoryService::new(db.clone(), events.clone(), feed.clone());
    let adjustments = AdjustmentService::new(db.clone(), events, feed);
    let site = seed_warehouse(&db, 3).await;
    let product_id = seed_product(&db, "WIDGET-1", "pcs").await;
    (db, inventory, adjustments, site, product_id)
}

#[tokio::test]
async fn receive_then_put_away_moves_stock_to_storage() {
    let (_db, inventory, _adjustments, site, product_id) = setup().await;

    let record = inventory
        .receive_stock(ReceiveStockRequest {
            product_id,
            bin_id: site.receiving_bin,
            quantity: dec!(25),
            color: None,
        })
        .await
        .expect("receive should succeed");
    assert_eq!(record.status, StockStatus::Received.to_string());
    assert_eq!(record.bin_id, site.receiving_bin);

    let moved = inventory
        .put_away(record.id, site.storage_bins[0])
        .await
        .expect("put away should succeed");
    assert_eq!(moved.status, StockStatus::InStorage.to_string());
    assert_eq!(moved.bin_id, site.storage_bins[0]);

    // A second put-away of the same record is rejected.
    let err = inventory
        .put_away(record.id, site.storage_bins[1])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn receiving_into_a_storage_bin_is_rejected() {
    let (_db, inventory, _adjustments, site, product_id) = setup().await;

    let err = inventory
        .receive_stock(ReceiveStockRequest {
            product_id,
            bin_id: site.storage_bins[0],
            quantity: dec!(5),
            color: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn add_adjustment_distributes_and_audits() {
    let (db, _inventory, adjustments, site, product_id) = setup().await;

    let result = adjustments
        .adjust(AdjustStockRequest {
            product_id,
            mode: AdjustmentMode::Add,
            quantity: dec!(10),
            bin_ids: site.storage_bins.clone(),
            reason: Some("initial count".into()),
            reference_number: Some("ADJ-1".into()),
            created_by: Some("tester".into()),
        })
        .await
        .expect("add should succeed");

    let allocated: Vec<_> = result.plan.iter().map(|p| p.adjustment_quantity).collect();
    assert_eq!(allocated, vec![dec!(4), dec!(3), dec!(3)]);

    // One audit row per bin, carrying before/after quantities.
    let audits = inventory_adjustment::Entity::find()
        .filter(inventory_adjustment::Column::ProductId.eq(product_id))
        .all(db.as_ref())
        .await
        .unwrap();
    assert_eq!(audits.len(), 3);
    assert!(audits.iter().all(|a| a.mode == "ADD"));
    assert!(audits
        .iter()
        .all(|a| a.reference_number.as_deref() == Some("ADJ-1")));

    // Stock rows now hold the distributed quantities.
    let rows = inventory_record::Entity::find()
        .filter(inventory_record::Column::ProductId.eq(product_id))
        .all(db.as_ref())
        .await
        .unwrap();
    let total: rust_decimal::Decimal = rows.iter().map(|r| r.quantity).sum();
    assert_eq!(total, dec!(10));
}

#[tokio::test]
async fn remove_shortfall_rolls_back_everything() {
    let (db, _inventory, adjustments, site, product_id) = setup().await;

    adjustments
        .adjust(AdjustStockRequest {
            product_id,
            mode: AdjustmentMode::Add,
            quantity: dec!(8),
            bin_ids: site.storage_bins.clone(),
            reason: None,
            reference_number: None,
            created_by: None,
        })
        .await
        .unwrap();
    let audits_before = inventory_adjustment::Entity::find()
        .count(db.as_ref())
        .await
        .unwrap();

    let err = adjustments
        .adjust(AdjustStockRequest {
            product_id,
            mode: AdjustmentMode::Remove,
            quantity: dec!(50),
            bin_ids: site.storage_bins.clone(),
            reason: None,
            reference_number: None,
            created_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // No partial writes: stock total and audit count are unchanged.
    let rows = inventory_record::Entity::find()
        .filter(inventory_record::Column::ProductId.eq(product_id))
        .all(db.as_ref())
        .await
        .unwrap();
    let total: rust_decimal::Decimal = rows.iter().map(|r| r.quantity).sum();
    assert_eq!(total, dec!(8));

    let audits_after = inventory_adjustment::Entity::find()
        .count(db.as_ref())
        .await
        .unwrap();
    assert_eq!(audits_after, audits_before);
}

#[tokio::test]
async fn replace_sets_the_new_item_total() {
    let (_db, inventory, adjustments, site, product_id) = setup().await;

    adjustments
        .adjust(AdjustStockRequest {
            product_id,
            mode: AdjustmentMode::Add,
            quantity: dec!(9),
            bin_ids: site.storage_bins.clone(),
            reason: None,
            reference_number: None,
            created_by: None,
        })
        .await
        .unwrap();

    adjustments
        .adjust(AdjustStockRequest {
            product_id,
            mode: AdjustmentMode::Replace,
            quantity: dec!(4),
            bin_ids: site.storage_bins.clone(),
            reason: Some("stocktake".into()),
            reference_number: None,
            created_by: None,
        })
        .await
        .unwrap();

    let positions = inventory
        .list_consolidated(StockFilter {
            product_id: Some(product_id),
            ..Default::default()
        })
        .await
        .unwrap();
    let total: rust_decimal::Decimal = positions.iter().map(|p| p.quantity).sum();
    assert_eq!(total, dec!(4));
}

#[tokio::test]
async fn adjustment_history_is_paginated_newest_first() {
    let (_db, _inventory, adjustments, site, product_id) = setup().await;

    for i in 1..=4 {
        adjustments
            .adjust(AdjustStockRequest {
                product_id,
                mode: AdjustmentMode::Add,
                quantity: rust_decimal::Decimal::from(i),
                bin_ids: vec![site.storage_bins[0]],
                reason: None,
                reference_number: Some(format!("ADJ-{}", i)),
                created_by: None,
            })
            .await
            .unwrap();
    }

    let (rows, total) = adjustments
        .list_adjustments(product_id, None, 1, 2)
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(rows.len(), 2);

    // Narrowing to a bin that was never touched yields nothing.
    let (_, untouched) = adjustments
        .list_adjustments(product_id, Some(site.storage_bins[1]), 1, 10)
        .await
        .unwrap();
    assert_eq!(untouched, 0);
}
