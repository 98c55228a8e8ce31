use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Unit).string().not_null())
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryRecords::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryRecords::BinId).uuid().not_null())
                    .col(
                        ColumnDef::new(InventoryRecords::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::Quantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryRecords::Unit).string().not_null())
                    .col(ColumnDef::new(InventoryRecords::Color).string().null())
                    .col(
                        ColumnDef::new(InventoryRecords::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryRecords::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_records_product")
                            .from(InventoryRecords::Table, InventoryRecords::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Audit log: one row per bin touched by an adjustment
        manager
            .create_table(
                Table::create()
                    .table(InventoryAdjustments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryAdjustments::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::ProductId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::BinId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::Mode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::QuantityBefore)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::AdjustmentQuantity)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::QuantityAfter)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryAdjustments::Reason).string().null())
                    .col(
                        ColumnDef::new(InventoryAdjustments::ReferenceNumber)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::CreatedBy)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(InventoryAdjustments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(InventoryAdjustments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Code,
    Name,
    Unit,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryRecords {
    Table,
    Id,
    ProductId,
    BinId,
    Status,
    Quantity,
    Unit,
    Color,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryAdjustments {
    Table,
    Id,
    ProductId,
    BinId,
    Mode,
    QuantityBefore,
    AdjustmentQuantity,
    QuantityAfter,
    Reason,
    ReferenceNumber,
    CreatedBy,
    CreatedAt,
}
