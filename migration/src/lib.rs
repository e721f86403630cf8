pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m020250601_000001_catalog_tables;
mod m020250601_000002_link_trackers;
mod m020250602_000001_add_to_cart_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m020250601_000001_catalog_tables::Migration),
            Box::new(m020250601_000002_link_trackers::Migration),
            Box::new(m020250602_000001_add_to_cart_events::Migration),
        ]
    }
}
