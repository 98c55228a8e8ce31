use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Smallest addressable storage location. `location_type` is one of
/// RECEIVING, STORAGE, DISPATCH (see `stock::LocationType`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "bins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub rack_id: Uuid,
    pub code: String,
    pub location_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rack::Entity",
        from = "Column::RackId",
        to = "super::rack::Column::Id"
    )]
    Rack,
    #[sea_orm(has_many = "super::inventory_record::Entity")]
    InventoryRecords,
}

impl Related<super::rack::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rack.def()
    }
}

impl Related<super::inventory_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
