//! Inventory service error types.

use thiserror::Error;

use bintrack_core::ValidationError;

use crate::db::RepositoryError;

/// Errors from inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No item with the given ID (or the ID is not a valid UUID).
    #[error("item not found: {0}")]
    NotFound(String),

    /// The request failed validation.
    #[error(transparent)]
    InvalidArgument(#[from] ValidationError),

    /// The item store failed.
    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}
