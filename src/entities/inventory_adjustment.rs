use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Audit log for inventory adjustments: one row per bin touched.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,
    pub product_id: Uuid,
    pub bin_id: Uuid,
    pub mode: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub quantity_before: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub adjustment_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub quantity_after: Decimal,
    pub reason: Option<String>,
    pub reference_number: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
