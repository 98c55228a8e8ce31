//! Receiving, put-away, and stock queries.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{bin, inventory_record, product};
use crate::errors::ServiceError;
use crate::events::feed::{ChangeFeed, FeedEntry, FeedKind};
use crate::events::{Event, EventSender};
use crate::stock::consolidation::{consolidate, ConsolidatedStock};
use crate::stock::{LocationType, StockStatus};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReceiveStockRequest {
    pub product_id: Uuid,
    /// Must be a RECEIVING bin.
    pub bin_id: Uuid,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Unit of measure, e.g. "pcs" or "m".
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StockFilter {
    pub product_id: Option<Uuid>,
    pub bin_id: Option<Uuid>,
    pub status: Option<StockStatus>,
}

#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    feed: Arc<ChangeFeed>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            db_pool,
            event_sender,
            feed,
        }
    }

    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        let existing = product::Entity::find()
            .filter(product::Column::Code.eq(request.code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "product code {} already exists",
                request.code
            )));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            name: Set(request.name),
            unit: Set(request.unit),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(db).await?)
    }

    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let paginator = product::Entity::find()
            .order_by_asc(product::Column::Code)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    /// Books incoming stock into a receiving bin as a RECEIVED record.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn receive_stock(
        &self,
        request: ReceiveStockRequest,
    ) -> Result<inventory_record::Model, ServiceError> {
        request.validate()?;
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(format!(
                "received quantity must be positive (got {})",
                request.quantity
            )));
        }

        let db = self.db_pool.as_ref();
        let product = product::Entity::find_by_id(request.product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("product {} not found", request.product_id))
            })?;
        let bin_row = require_bin(db, request.bin_id, LocationType::Receiving).await?;

        let now = Utc::now();
        let record = inventory_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            bin_id: Set(bin_row.id),
            status: Set(StockStatus::Received.to_string()),
            quantity: Set(request.quantity),
            unit: Set(product.unit.clone()),
            color: Set(request.color.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let record = record.insert(db).await?;

        info!(record_id = %record.id, bin = %bin_row.code, "stock received");
        self.event_sender
            .send(Event::InventoryReceived {
                record_id: record.id,
                product_id: record.product_id,
                bin_id: record.bin_id,
                quantity: record.quantity,
            })
            .await?;
        self.publish_change(record.id);

        Ok(record)
    }

    /// Moves a RECEIVED record into a storage bin and marks it IN_STORAGE.
    #[instrument(skip(self))]
    pub async fn put_away(
        &self,
        record_id: Uuid,
        to_bin_id: Uuid,
    ) -> Result<inventory_record::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let (updated, from_bin_id) = db
            .transaction::<_, (inventory_record::Model, Uuid), ServiceError>(move |txn| {
                Box::pin(async move {
                    let record = inventory_record::Entity::find_by_id(record_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "inventory record {} not found",
                                record_id
                            ))
                        })?;
                    if record.status != StockStatus::Received.to_string() {
                        return Err(ServiceError::InvalidOperation(format!(
                            "record {} is {}, only RECEIVED stock can be put away",
                            record.id, record.status
                        )));
                    }
                    let target = require_bin(txn, to_bin_id, LocationType::Storage).await?;

                    let from_bin_id = record.bin_id;
                    let mut active: inventory_record::ActiveModel = record.into();
                    active.bin_id = Set(target.id);
                    active.status = Set(StockStatus::InStorage.to_string());
                    active.updated_at = Set(Utc::now());
                    let updated = active.update(txn).await?;

                    info!(record_id = %updated.id, from = %from_bin_id, to = %target.code, "stock put away");
                    Ok((updated, from_bin_id))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        self.event_sender
            .send(Event::StockPutAway {
                record_id: updated.id,
                from_bin_id,
                to_bin_id: updated.bin_id,
            })
            .await?;
        self.publish_change(updated.id);

        Ok(updated)
    }

    /// Lists raw inventory rows matching the filter, newest first.
    pub async fn list_records(
        &self,
        filter: StockFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<inventory_record::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = inventory_record::Entity::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(inventory_record::Column::ProductId.eq(product_id));
        }
        if let Some(bin_id) = filter.bin_id {
            query = query.filter(inventory_record::Column::BinId.eq(bin_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(inventory_record::Column::Status.eq(status.to_string()));
        }

        let paginator = query
            .order_by_desc(inventory_record::Column::UpdatedAt)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    /// Returns the consolidated stock view for the filter.
    pub async fn list_consolidated(
        &self,
        filter: StockFilter,
    ) -> Result<Vec<ConsolidatedStock>, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = inventory_record::Entity::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(inventory_record::Column::ProductId.eq(product_id));
        }
        if let Some(bin_id) = filter.bin_id {
            query = query.filter(inventory_record::Column::BinId.eq(bin_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(inventory_record::Column::Status.eq(status.to_string()));
        }

        let rows = query
            .order_by_asc(inventory_record::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(consolidate(&rows))
    }

    fn publish_change(&self, record_id: Uuid) {
        self.feed.publish(FeedEntry {
            record_id,
            revision: self.feed.next_revision(),
            kind: FeedKind::InventoryChanged,
            occurred_at: Utc::now(),
        });
    }
}

/// Loads a bin and checks that it is active and of the expected role.
pub(crate) async fn require_bin<C>(
    db: &C,
    bin_id: Uuid,
    expected: LocationType,
) -> Result<bin::Model, ServiceError>
where
    C: sea_orm::ConnectionTrait,
{
    let bin_row = bin::Entity::find_by_id(bin_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("bin {} not found", bin_id)))?;
    if !bin_row.active {
        return Err(ServiceError::InvalidOperation(format!(
            "bin {} is inactive",
            bin_row.code
        )));
    }
    if bin_row.location_type != expected.to_string() {
        return Err(ServiceError::InvalidOperation(format!(
            "bin {} is a {} location, expected {}",
            bin_row.code, bin_row.location_type, expected
        )));
    }
    Ok(bin_row)
}
