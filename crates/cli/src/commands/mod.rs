//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod ship_list;

use std::sync::Arc;

use bintrack_server::config::{ConfigError, get_required_env};
use bintrack_server::db::{self, PgItemStore};
use bintrack_server::services::InventoryService;
use secrecy::SecretString;
use sqlx::PgPool;

/// Connect to the database named by `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the variable is unset or the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = SecretString::from(get_required_env("DATABASE_URL")?);

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}

/// Inventory service over the configured database.
///
/// # Errors
///
/// Returns an error if the database cannot be reached.
pub async fn inventory() -> Result<InventoryService, CommandError> {
    let pool = connect().await?;
    Ok(InventoryService::new(Arc::new(PgItemStore::new(pool))))
}

/// Errors shared by the database-backed commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Inventory(#[from] bintrack_server::services::InventoryError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
