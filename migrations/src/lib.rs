pub use sea_orm_migration::prelude::*;

mod m20240901_000001_create_storage_tables;
mod m20240901_000002_create_inventory_tables;
mod m20240901_000003_create_chat_tables;
mod m20240901_000004_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_create_storage_tables::Migration),
            Box::new(m20240901_000002_create_inventory_tables::Migration),
            Box::new(m20240901_000003_create_chat_tables::Migration),
            Box::new(m20240901_000004_add_lookup_indexes::Migration),
        ]
    }
}
