//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::ItemStore;
use crate::services::{InventoryService, PlatformRepository, PlatformService, UploadStore};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// services behind the HTTP API.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    inventory: InventoryService,
    platforms: PlatformService,
    uploads: UploadStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Item storage backend
    /// * `platforms` - Platform list persistence
    ///
    /// The platform list starts as the defaults; call
    /// [`PlatformService::load`] on [`Self::platforms`] to read the saved one.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn ItemStore>,
        platforms: Arc<dyn PlatformRepository>,
    ) -> Self {
        let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                inventory: InventoryService::new(store),
                platforms: PlatformService::new(platforms),
                uploads,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the inventory service.
    #[must_use]
    pub fn inventory(&self) -> &InventoryService {
        &self.inner.inventory
    }

    /// Get a reference to the platform service.
    #[must_use]
    pub fn platforms(&self) -> &PlatformService {
        &self.inner.platforms
    }

    /// Get a reference to the upload store.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }
}
