//! User-editable marketplace platform list.
//!
//! The list is cached in memory and written through to a
//! [`PlatformRepository`] on every change. Writes hold the cache lock while
//! persisting, so concurrent edits are applied one at a time and a failed
//! write leaves the cached list untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use bintrack_core::{Platform, PlatformChanges, PlatformDraft, PlatformError, PlatformList};

/// Errors from reading or writing the persisted platform list.
#[derive(Debug, Error)]
pub enum PlatformStoreError {
    #[error("platform file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("platform file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from platform service operations.
#[derive(Debug, Error)]
pub enum PlatformServiceError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Storage(#[from] PlatformStoreError),
}

/// Persistence for the whole platform list.
#[async_trait]
pub trait PlatformRepository: Send + Sync {
    /// Load the saved list, or `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<PlatformList>, PlatformStoreError>;

    /// Replace the saved list.
    async fn save(&self, platforms: &PlatformList) -> Result<(), PlatformStoreError>;
}

// =============================================================================
// JSON file repository
// =============================================================================

/// Stores the list as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFilePlatformRepository {
    path: PathBuf,
}

impl JsonFilePlatformRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlatformRepository for JsonFilePlatformRepository {
    async fn load(&self) -> Result<Option<PlatformList>, PlatformStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, platforms: &PlatformList) -> Result<(), PlatformStoreError> {
        let json = serde_json::to_vec_pretty(platforms)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write then rename so a crash never leaves a truncated file behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory repository
// =============================================================================

/// Keeps the saved list in memory. Used in tests.
#[derive(Debug, Default)]
pub struct MemoryPlatformRepository {
    saved: RwLock<Option<PlatformList>>,
}

impl MemoryPlatformRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved list.
    pub async fn saved(&self) -> Option<PlatformList> {
        self.saved.read().await.clone()
    }
}

#[async_trait]
impl PlatformRepository for MemoryPlatformRepository {
    async fn load(&self) -> Result<Option<PlatformList>, PlatformStoreError> {
        Ok(self.saved.read().await.clone())
    }

    async fn save(&self, platforms: &PlatformList) -> Result<(), PlatformStoreError> {
        *self.saved.write().await = Some(platforms.clone());
        Ok(())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Platform list service.
pub struct PlatformService {
    repository: Arc<dyn PlatformRepository>,
    platforms: RwLock<PlatformList>,
}

impl PlatformService {
    /// Create a service holding the default list. Call [`Self::load`] to read
    /// the saved one.
    #[must_use]
    pub fn new(repository: Arc<dyn PlatformRepository>) -> Self {
        Self {
            repository,
            platforms: RwLock::new(PlatformList::default()),
        }
    }

    /// Replace the cached list with the saved one.
    ///
    /// Nothing saved yet means the defaults. A list that cannot be read is
    /// logged and the defaults are used instead.
    pub async fn load(&self) -> Vec<Platform> {
        let loaded = match self.repository.load().await {
            Ok(Some(list)) => {
                info!(count = list.as_slice().len(), "Loaded platform list");
                list
            }
            Ok(None) => {
                info!("No saved platform list, using defaults");
                PlatformList::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load platform list, using defaults");
                PlatformList::default()
            }
        };

        let mut platforms = self.platforms.write().await;
        *platforms = loaded;
        platforms.as_slice().to_vec()
    }

    /// The current list, in display order.
    pub async fn list(&self) -> Vec<Platform> {
        self.platforms.read().await.as_slice().to_vec()
    }

    /// Edit one platform.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::NotFound` for an unknown id, a validation
    /// error for a bad name or color, or `Storage` if saving fails.
    #[instrument(skip(self, changes), err(level = "warn"))]
    pub async fn update(
        &self,
        id: &str,
        changes: PlatformChanges,
    ) -> Result<Platform, PlatformServiceError> {
        self.mutate(|list| list.update(id, changes).cloned()).await
    }

    /// Append a platform, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad name or color, or `Storage` if
    /// saving fails.
    #[instrument(skip(self, draft), err(level = "warn"))]
    pub async fn add(&self, draft: PlatformDraft) -> Result<Platform, PlatformServiceError> {
        let now = Utc::now().timestamp_millis();
        let platform = self.mutate(|list| list.add(draft, now).cloned()).await?;
        info!(platform_id = %platform.id, "Platform added");
        Ok(platform)
    }

    /// Remove a platform.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::NotFound` for an unknown id, or `Storage` if
    /// saving fails.
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn remove(&self, id: &str) -> Result<Platform, PlatformServiceError> {
        self.mutate(|list| list.remove(id)).await
    }

    /// Reorder the list.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::NotAPermutation` unless `ids` lists every
    /// platform exactly once, or `Storage` if saving fails.
    #[instrument(skip(self, ids), err(level = "warn"))]
    pub async fn reorder(&self, ids: &[String]) -> Result<Vec<Platform>, PlatformServiceError> {
        self.mutate(|list| {
            list.reorder(ids)?;
            Ok(list.as_slice().to_vec())
        })
        .await
    }

    async fn mutate<T, F>(&self, edit: F) -> Result<T, PlatformServiceError>
    where
        F: FnOnce(&mut PlatformList) -> Result<T, PlatformError>,
    {
        let mut platforms = self.platforms.write().await;
        let mut next = platforms.clone();
        let out = edit(&mut next)?;
        self.repository.save(&next).await?;
        *platforms = next;
        Ok(out)
    }
}
