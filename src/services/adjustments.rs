//! Transactional inventory adjustments.
//!
//! An adjustment is planned with the pure distribution planner, then the
//! plan, the affected inventory rows, and one audit row per bin are all
//! written inside a single database transaction. A shortfall or any other
//! planning failure therefore leaves the database untouched.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{bin, inventory_adjustment, inventory_record, product};
use crate::errors::ServiceError;
use crate::events::feed::{ChangeFeed, FeedEntry, FeedKind};
use crate::events::{Event, EventSender};
use crate::stock::distribution::{plan_distribution, BinAdjustment, BinSnapshot};
use crate::stock::{AdjustmentMode, StockStatus};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    pub product_id: Uuid,
    pub mode: AdjustmentMode,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    /// Bins the adjustment is distributed over, in selection order.
    #[validate(length(min = 1, message = "at least one bin must be selected"))]
    pub bin_ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub reference_number: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdjustStockResult {
    pub product_id: Uuid,
    pub mode: AdjustmentMode,
    pub plan: Vec<BinAdjustment>,
    pub adjustment_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct AdjustmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    feed: Arc<ChangeFeed>,
}

impl AdjustmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            db_pool,
            event_sender,
            feed,
        }
    }

    /// Applies an adjustment across the selected bins in one transaction.
    #[instrument(skip(self, request), fields(product_id = %request.product_id, mode = %request.mode))]
    pub async fn adjust(
        &self,
        request: AdjustStockRequest,
    ) -> Result<AdjustStockResult, ServiceError> {
        request.validate()?;

        let db = self.db_pool.as_ref();
        let req = request.clone();

        let (result, touched_record_ids) = db
            .transaction::<_, (AdjustStockResult, Vec<Uuid>), ServiceError>(move |txn| {
                Box::pin(async move {
                    let product = product::Entity::find_by_id(req.product_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("product {} not found", req.product_id))
                        })?;

                    // Load the selected bins and their current stock, in
                    // selection order. The remainder and drain rules both
                    // depend on this order.
                    let mut snapshots = Vec::with_capacity(req.bin_ids.len());
                    let mut rows_by_bin: Vec<Vec<inventory_record::Model>> =
                        Vec::with_capacity(req.bin_ids.len());
                    for bin_id in &req.bin_ids {
                        let bin_row = bin::Entity::find_by_id(*bin_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("bin {} not found", bin_id))
                            })?;
                        if !bin_row.active {
                            return Err(ServiceError::InvalidOperation(format!(
                                "bin {} is inactive",
                                bin_row.code
                            )));
                        }

                        // Rows are locked for the transaction so a
                        // concurrent removal cannot pass the same
                        // availability check. Sqlite serializes writers
                        // and skips the clause.
                        let rows = inventory_record::Entity::find()
                            .filter(inventory_record::Column::ProductId.eq(req.product_id))
                            .filter(inventory_record::Column::BinId.eq(*bin_id))
                            .filter(
                                inventory_record::Column::Status
                                    .eq(StockStatus::InStorage.to_string()),
                            )
                            .order_by_asc(inventory_record::Column::CreatedAt)
                            .lock_exclusive()
                            .all(txn)
                            .await?;

                        let current: Decimal = rows.iter().map(|r| r.quantity).sum();
                        snapshots.push(BinSnapshot {
                            bin_id: *bin_id,
                            current_quantity: current,
                        });
                        rows_by_bin.push(rows);
                    }

                    let plan = plan_distribution(req.mode, req.quantity, &snapshots)?;

                    let now = Utc::now();
                    let mut adjustment_ids = Vec::with_capacity(plan.len());
                    let mut touched = Vec::new();

                    for (step, rows) in plan.iter().zip(rows_by_bin) {
                        let record_id =
                            apply_bin_quantity(txn, &product, step, rows, now).await?;
                        touched.push(record_id);

                        let audit = inventory_adjustment::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            product_id: Set(req.product_id),
                            bin_id: Set(step.bin_id),
                            mode: Set(req.mode.to_string()),
                            quantity_before: Set(step.quantity_before),
                            adjustment_quantity: Set(step.adjustment_quantity),
                            quantity_after: Set(step.quantity_after),
                            reason: Set(req.reason.clone()),
                            reference_number: Set(req.reference_number.clone()),
                            created_by: Set(req.created_by.clone()),
                            created_at: Set(now),
                        };
                        let audit = audit.insert(txn).await?;
                        adjustment_ids.push(audit.id);
                    }

                    Ok((
                        AdjustStockResult {
                            product_id: req.product_id,
                            mode: req.mode,
                            plan,
                            adjustment_ids,
                        },
                        touched,
                    ))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            product_id = %result.product_id,
            bins = result.plan.len(),
            "inventory adjustment committed"
        );

        self.event_sender
            .send(Event::InventoryAdjusted {
                product_id: result.product_id,
                mode: result.mode.to_string(),
                quantity: request.quantity,
                bin_count: result.plan.len(),
                reference_number: request.reference_number.clone(),
            })
            .await?;

        for record_id in touched_record_ids {
            self.feed.publish(FeedEntry {
                record_id,
                revision: self.feed.next_revision(),
                kind: FeedKind::InventoryChanged,
                occurred_at: Utc::now(),
            });
        }

        Ok(result)
    }

    /// Returns the audit trail for a product, newest first, optionally
    /// narrowed to one bin.
    pub async fn list_adjustments(
        &self,
        product_id: Uuid,
        bin_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<inventory_adjustment::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = inventory_adjustment::Entity::find()
            .filter(inventory_adjustment::Column::ProductId.eq(product_id));
        if let Some(bin_id) = bin_id {
            query = query.filter(inventory_adjustment::Column::BinId.eq(bin_id));
        }
        let paginator = query
            .order_by_desc(inventory_adjustment::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }
}

/// Writes one bin's planned quantity back to the inventory rows: the
/// oldest row takes the new total and any other rows for the same
/// position are removed, so an adjustment also consolidates the bin.
async fn apply_bin_quantity<C>(
    txn: &C,
    product: &product::Model,
    step: &BinAdjustment,
    rows: Vec<inventory_record::Model>,
    now: chrono::DateTime<Utc>,
) -> Result<Uuid, ServiceError>
where
    C: sea_orm::ConnectionTrait,
{
    match rows.split_first() {
        Some((first, rest)) => {
            for extra in rest {
                inventory_record::Entity::delete_by_id(extra.id)
                    .exec(txn)
                    .await?;
            }
            let mut active: inventory_record::ActiveModel = first.clone().into();
            active.quantity = Set(step.quantity_after);
            active.updated_at = Set(now);
            let updated = active.update(txn).await?;
            Ok(updated.id)
        }
        None => {
            let record = inventory_record::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                bin_id: Set(step.bin_id),
                status: Set(StockStatus::InStorage.to_string()),
                quantity: Set(step.quantity_after),
                unit: Set(product.unit.clone()),
                color: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let inserted = record.insert(txn).await?;
            Ok(inserted.id)
        }
    }
}
