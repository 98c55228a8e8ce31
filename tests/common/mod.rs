//! Shared helpers for integration tests: an in-memory database with the
//! full schema plus seed data for a small warehouse.

#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, Set};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use warehouse_api::db::{run_migrations, DbPool};
use warehouse_api::entities::{bin, customer_order, floor, product, rack, user_profile, warehouse};
use warehouse_api::events::feed::ChangeFeed;
use warehouse_api::events::{process_events, EventSender};
use warehouse_api::stock::LocationType;

pub async fn test_db() -> Arc<DbPool> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");
    run_migrations(&db).await.expect("failed to run migrations");
    Arc::new(db)
}

/// Event sender backed by the real processing loop, so the channel
/// stays open for the whole test.
pub fn test_events() -> Arc<EventSender> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(process_events(rx));
    Arc::new(EventSender::new(tx))
}

pub fn test_feed() -> Arc<ChangeFeed> {
    Arc::new(ChangeFeed::new(64))
}

pub struct SeededWarehouse {
    pub warehouse_id: Uuid,
    pub floor_id: Uuid,
    pub rack_id: Uuid,
    pub receiving_bin: Uuid,
    pub storage_bins: Vec<Uuid>,
}

/// One warehouse with a receiving bin and `storage_bins` storage bins.
pub async fn seed_warehouse(db: &DbPool, storage_bins: usize) -> SeededWarehouse {
    let now = Utc::now();
    let warehouse_row = warehouse::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(format!("WH-{}", &Uuid::new_v4().to_string()[..8])),
        name: Set("Test warehouse".into()),
        address: Set(None),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert warehouse");

    let floor_row = floor::ActiveModel {
        id: Set(Uuid::new_v4()),
        warehouse_id: Set(warehouse_row.id),
        code: Set("F1".into()),
        name: Set("Ground floor".into()),
        level: Set(Some(0)),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert floor");

    let rack_row = rack::ActiveModel {
        id: Set(Uuid::new_v4()),
        floor_id: Set(floor_row.id),
        code: Set("R1".into()),
        name: Set("Rack 1".into()),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert rack");

    let receiving = insert_bin(db, rack_row.id, "RECV-1", LocationType::Receiving).await;
    let mut bins = Vec::with_capacity(storage_bins);
    for i in 0..storage_bins {
        bins.push(insert_bin(db, rack_row.id, &format!("BIN-{}", i + 1), LocationType::Storage).await);
    }

    SeededWarehouse {
        warehouse_id: warehouse_row.id,
        floor_id: floor_row.id,
        rack_id: rack_row.id,
        receiving_bin: receiving,
        storage_bins: bins,
    }
}

pub async fn insert_bin(db: &DbPool, rack_id: Uuid, code: &str, kind: LocationType) -> Uuid {
    let now = Utc::now();
    let row = bin::ActiveModel {
        id: Set(Uuid::new_v4()),
        rack_id: Set(rack_id),
        code: Set(code.to_string()),
        location_type: Set(kind.to_string()),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert bin");
    row.id
}

pub async fn seed_product(db: &DbPool, code: &str, unit: &str) -> Uuid {
    let now = Utc::now();
    let row = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(format!("Product {}", code)),
        unit: Set(unit.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert product");
    row.id
}

pub async fn seed_user(db: &DbPool, display_name: &str) -> Uuid {
    let row = user_profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        display_name: Set(display_name.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert user profile");
    row.id
}

pub async fn seed_order(db: &DbPool, order_number: &str) -> Uuid {
    let row = customer_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_number: Set(order_number.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert customer order");
    row.id
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}
