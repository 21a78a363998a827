//! Database layer for forum-rs.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use forum_common::{AppError, config::DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Open the connection pool described by the `database` configuration section.
pub async fn init(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.url);

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;

    let pending = migrations::Migrator::get_pending_migrations(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!(pending = pending.len(), "Applying database migrations");

    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
