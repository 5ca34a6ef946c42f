//! Test utilities for database integration tests
//!
//! Provides a migrated in-memory SQLite database for integration tests
//! across all sitios crates. Each `TestDatabase` is fully isolated: SQLite
//! in-memory databases are private to their connection.

use crate::DbConnection;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use sitios_migrations::Migrator;
use std::sync::Arc;

/// An isolated, migrated test database.
pub struct TestDatabase {
    pub db: Arc<DbConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations against it.
    pub async fn new() -> anyhow::Result<Self> {
        // A single connection keeps the in-memory database alive for the
        // whole test; more connections would each see their own empty db.
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);

        let db = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn migrated_schema_has_core_tables() -> anyhow::Result<()> {
        let test_db = TestDatabase::new().await?;

        for table in ["microsites", "pages", "content_blocks"] {
            let stmt = Statement::from_string(
                test_db.db.get_database_backend(),
                format!("SELECT COUNT(*) FROM {table}"),
            );
            let row = test_db.db.query_one(stmt).await?;
            assert!(row.is_some(), "table {table} should exist");
        }

        Ok(())
    }
}
