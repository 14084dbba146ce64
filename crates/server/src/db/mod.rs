pub mod models;
pub mod services;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

pub type DbPool = sqlx::SqlitePool;

/// Opens the SQLite pool and bootstraps the schema. Acquisition is bounded
/// so a wedged store surfaces as an error instead of stalling ingestion.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    let schema = include_str!("../../migrations/20250801000000_init.sql");
    sqlx::raw_sql(schema).execute(pool).await?;
    info!("Database schema initialized.");
    Ok(())
}
