use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Warehouses::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Warehouses::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Warehouses::Name).string().not_null())
                    .col(ColumnDef::new(Warehouses::Address).string().null())
                    .col(
                        ColumnDef::new(Warehouses::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Warehouses::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Warehouses::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Floors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Floors::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Floors::WarehouseId).uuid().not_null())
                    .col(ColumnDef::new(Floors::Code).string().not_null())
                    .col(ColumnDef::new(Floors::Name).string().not_null())
                    .col(ColumnDef::new(Floors::Level).integer().null())
                    .col(
                        ColumnDef::new(Floors::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Floors::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Floors::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_floors_warehouse")
                            .from(Floors::Table, Floors::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Racks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Racks::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Racks::FloorId).uuid().not_null())
                    .col(ColumnDef::new(Racks::Code).string().not_null())
                    .col(ColumnDef::new(Racks::Name).string().not_null())
                    .col(
                        ColumnDef::new(Racks::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Racks::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Racks::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_racks_floor")
                            .from(Racks::Table, Racks::FloorId)
                            .to(Floors::Table, Floors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bins::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Bins::RackId).uuid().not_null())
                    .col(ColumnDef::new(Bins::Code).string().not_null())
                    .col(ColumnDef::new(Bins::LocationType).string().not_null())
                    .col(
                        ColumnDef::new(Bins::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Bins::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Bins::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bins_rack")
                            .from(Bins::Table, Bins::RackId)
                            .to(Racks::Table, Racks::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bins::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Racks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Floors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Warehouses {
    Table,
    Id,
    Code,
    Name,
    Address,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Floors {
    Table,
    Id,
    WarehouseId,
    Code,
    Name,
    Level,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Racks {
    Table,
    Id,
    FloorId,
    Code,
    Name,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bins {
    Table,
    Id,
    RackId,
    Code,
    LocationType,
    Active,
    CreatedAt,
    UpdatedAt,
}
