use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_records_product_bin")
                    .table(InventoryRecords::Table)
                    .col(InventoryRecords::ProductId)
                    .col(InventoryRecords::BinId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_records_status")
                    .table(InventoryRecords::Table)
                    .col(InventoryRecords::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_adjustments_product")
                    .table(InventoryAdjustments::Table)
                    .col(InventoryAdjustments::ProductId)
                    .col(InventoryAdjustments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_messages_created_at")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_floors_warehouse")
                    .table(Floors::Table)
                    .col(Floors::WarehouseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_racks_floor")
                    .table(Racks::Table)
                    .col(Racks::FloorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bins_rack")
                    .table(Bins::Table)
                    .col(Bins::RackId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_bins_rack",
            "idx_racks_floor",
            "idx_floors_warehouse",
            "idx_chat_messages_created_at",
            "idx_inventory_adjustments_product",
            "idx_inventory_records_status",
            "idx_inventory_records_product_bin",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum InventoryRecords {
    Table,
    ProductId,
    BinId,
    Status,
}

#[derive(DeriveIden)]
enum InventoryAdjustments {
    Table,
    ProductId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Floors {
    Table,
    WarehouseId,
}

#[derive(DeriveIden)]
enum Racks {
    Table,
    FloorId,
}

#[derive(DeriveIden)]
enum Bins {
    Table,
    RackId,
}
