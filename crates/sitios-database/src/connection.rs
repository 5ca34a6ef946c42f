//! Database connection management

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sitios_migrations::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use sitios_core::{ServiceError, ServiceResult};

pub type DbConnection = DatabaseConnection;

/// Connect to the database and bring the schema up to date.
pub async fn establish_connection(database_url: &str) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(50)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10));

    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Migrator::up(&db, None)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Ok(Arc::new(db))
}
