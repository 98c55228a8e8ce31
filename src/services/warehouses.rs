//! Warehouse topology: warehouses, floors, racks, and bins.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{bin, floor, inventory_record, rack, warehouse};
use crate::errors::ServiceError;
use crate::events::feed::{ChangeFeed, FeedEntry, FeedKind};
use crate::events::{Event, EventSender};
use crate::stock::LocationType;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateWarehouseRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFloorRequest {
    pub warehouse_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub level: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRackRequest {
    pub floor_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBinRequest {
    pub rack_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub location_type: LocationType,
}

/// Fully nested topology of one warehouse.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WarehouseTree {
    #[serde(flatten)]
    pub warehouse: warehouse::Model,
    pub floors: Vec<FloorTree>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FloorTree {
    #[serde(flatten)]
    pub floor: floor::Model,
    pub racks: Vec<RackTree>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RackTree {
    #[serde(flatten)]
    pub rack: rack::Model,
    pub bins: Vec<bin::Model>,
}

#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    feed: Arc<ChangeFeed>,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            db_pool,
            event_sender,
            feed,
        }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_warehouse(
        &self,
        request: CreateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        let existing = warehouse::Entity::find()
            .filter(warehouse::Column::Code.eq(request.code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "warehouse code {} already exists",
                request.code
            )));
        }

        let now = Utc::now();
        let model = warehouse::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            name: Set(request.name),
            address: Set(request.address),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(db).await?;

        info!(warehouse_id = %created.id, "warehouse created");
        self.event_sender
            .send(Event::WarehouseCreated(created.id))
            .await?;
        self.publish_change(created.id);
        Ok(created)
    }

    pub async fn update_warehouse(
        &self,
        warehouse_id: Uuid,
        request: UpdateWarehouseRequest,
    ) -> Result<warehouse::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        let existing = self.get_warehouse(warehouse_id).await?;

        let mut active: warehouse::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(flag) = request.active {
            active.active = Set(flag);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        self.event_sender
            .send(Event::WarehouseUpdated(updated.id))
            .await?;
        self.publish_change(updated.id);
        Ok(updated)
    }

    pub async fn get_warehouse(&self, warehouse_id: Uuid) -> Result<warehouse::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        warehouse::Entity::find_by_id(warehouse_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("warehouse {} not found", warehouse_id)))
    }

    pub async fn list_warehouses(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<warehouse::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let paginator = warehouse::Entity::find()
            .order_by_asc(warehouse::Column::Code)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    /// Deletes a warehouse. Refused while any floor still exists under it.
    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, warehouse_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = self.get_warehouse(warehouse_id).await?;

        let floor_count = floor::Entity::find()
            .filter(floor::Column::WarehouseId.eq(warehouse_id))
            .count(db)
            .await?;
        if floor_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "warehouse {} still has {} floors",
                existing.code, floor_count
            )));
        }

        existing.delete(db).await?;
        self.event_sender
            .send(Event::WarehouseDeleted(warehouse_id))
            .await?;
        self.publish_change(warehouse_id);
        Ok(())
    }

    pub async fn create_floor(
        &self,
        request: CreateFloorRequest,
    ) -> Result<floor::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        // Parent must exist.
        self.get_warehouse(request.warehouse_id).await?;

        let now = Utc::now();
        let model = floor::ActiveModel {
            id: Set(Uuid::new_v4()),
            warehouse_id: Set(request.warehouse_id),
            code: Set(request.code),
            name: Set(request.name),
            level: Set(request.level),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(db).await?;
        self.publish_change(created.id);
        Ok(created)
    }

    pub async fn delete_floor(&self, floor_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = floor::Entity::find_by_id(floor_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("floor {} not found", floor_id)))?;

        let rack_count = rack::Entity::find()
            .filter(rack::Column::FloorId.eq(floor_id))
            .count(db)
            .await?;
        if rack_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "floor {} still has {} racks",
                existing.code, rack_count
            )));
        }
        existing.delete(db).await?;
        self.publish_change(floor_id);
        Ok(())
    }

    pub async fn create_rack(
        &self,
        request: CreateRackRequest,
    ) -> Result<rack::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        floor::Entity::find_by_id(request.floor_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("floor {} not found", request.floor_id))
            })?;

        let now = Utc::now();
        let model = rack::ActiveModel {
            id: Set(Uuid::new_v4()),
            floor_id: Set(request.floor_id),
            code: Set(request.code),
            name: Set(request.name),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(db).await?;
        self.publish_change(created.id);
        Ok(created)
    }

    pub async fn delete_rack(&self, rack_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = rack::Entity::find_by_id(rack_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("rack {} not found", rack_id)))?;

        let bin_count = bin::Entity::find()
            .filter(bin::Column::RackId.eq(rack_id))
            .count(db)
            .await?;
        if bin_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "rack {} still has {} bins",
                existing.code, bin_count
            )));
        }
        existing.delete(db).await?;
        self.publish_change(rack_id);
        Ok(())
    }

    pub async fn create_bin(&self, request: CreateBinRequest) -> Result<bin::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        rack::Entity::find_by_id(request.rack_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("rack {} not found", request.rack_id)))?;

        let now = Utc::now();
        let model = bin::ActiveModel {
            id: Set(Uuid::new_v4()),
            rack_id: Set(request.rack_id),
            code: Set(request.code),
            location_type: Set(request.location_type.to_string()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(db).await?;

        self.event_sender
            .send(Event::BinCreated {
                bin_id: created.id,
                rack_id: created.rack_id,
            })
            .await?;
        self.publish_change(created.id);
        Ok(created)
    }

    /// Deletes a bin. Refused while stock is still booked on it.
    pub async fn delete_bin(&self, bin_id: Uuid) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        let existing = bin::Entity::find_by_id(bin_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("bin {} not found", bin_id)))?;

        let stock_count = inventory_record::Entity::find()
            .filter(inventory_record::Column::BinId.eq(bin_id))
            .count(db)
            .await?;
        if stock_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "bin {} still holds {} inventory records",
                existing.code, stock_count
            )));
        }
        existing.delete(db).await?;
        self.publish_change(bin_id);
        Ok(())
    }

    /// Builds the nested floor/rack/bin tree for one warehouse.
    pub async fn get_hierarchy(&self, warehouse_id: Uuid) -> Result<WarehouseTree, ServiceError> {
        let db = self.db_pool.as_ref();
        let warehouse_row = self.get_warehouse(warehouse_id).await?;

        let floors = floor::Entity::find()
            .filter(floor::Column::WarehouseId.eq(warehouse_id))
            .order_by_asc(floor::Column::Code)
            .all(db)
            .await?;

        let mut floor_trees = Vec::with_capacity(floors.len());
        for floor_row in floors {
            let racks = rack::Entity::find()
                .filter(rack::Column::FloorId.eq(floor_row.id))
                .order_by_asc(rack::Column::Code)
                .all(db)
                .await?;

            let mut rack_trees = Vec::with_capacity(racks.len());
            for rack_row in racks {
                let bins = bin::Entity::find()
                    .filter(bin::Column::RackId.eq(rack_row.id))
                    .order_by_asc(bin::Column::Code)
                    .all(db)
                    .await?;
                rack_trees.push(RackTree {
                    rack: rack_row,
                    bins,
                });
            }
            floor_trees.push(FloorTree {
                floor: floor_row,
                racks: rack_trees,
            });
        }

        Ok(WarehouseTree {
            warehouse: warehouse_row,
            floors: floor_trees,
        })
    }

    fn publish_change(&self, record_id: Uuid) {
        self.feed.publish(FeedEntry {
            record_id,
            revision: self.feed.next_revision(),
            kind: FeedKind::WarehouseChanged,
            occurred_at: Utc::now(),
        });
    }
}
