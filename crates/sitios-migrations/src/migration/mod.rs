pub use sea_orm_migration::prelude::*;

mod m20260110_000001_initial_schema;
mod m20260124_000001_add_custom_domain_unique;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_initial_schema::Migration),
            Box::new(m20260124_000001_add_custom_domain_unique::Migration),
        ]
    }
}
