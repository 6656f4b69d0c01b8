//! Item persistence.
//!
//! # Tables
//!
//! - `inventory_items` - one row per tracked item, status stored as the
//!   `item_status` enum
//!
//! # Backends
//!
//! - [`PgItemStore`] - `PostgreSQL`, used whenever `DATABASE_URL` is set
//! - [`MemoryItemStore`] - process-local, used for development and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bintrack-cli -- migrate
//! ```

pub mod items;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bintrack_core::{InventoryItem, ItemChanges, ItemDraft, ItemFilter, ItemId};

pub use items::PgItemStore;
pub use memory::MemoryItemStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage backend for inventory items.
///
/// Stores persist exactly what they are given: validation and status side
/// effects are resolved before a call reaches them. Listing methods return
/// items newest first by `created_at`.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Items matching `filter`, newest first.
    async fn list(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, RepositoryError>;

    /// A single item by ID.
    async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, RepositoryError>;

    /// The items among `ids` that exist, newest first.
    async fn get_many(&self, ids: &[ItemId]) -> Result<Vec<InventoryItem>, RepositoryError>;

    /// Persist a new item, assigning its ID and timestamps.
    async fn insert(&self, draft: ItemDraft) -> Result<InventoryItem, RepositoryError>;

    /// Apply `changes` and bump `updated_at`. Returns `None` if the item does not exist.
    async fn update(
        &self,
        id: ItemId,
        changes: &ItemChanges,
    ) -> Result<Option<InventoryItem>, RepositoryError>;

    /// Permanently remove an item. Returns `false` if it did not exist.
    async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError>;

    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
