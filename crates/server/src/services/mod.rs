//! Business logic services.
//!
//! # Services
//!
//! - `inventory` - Item lifecycle, search, photo search and the shipping worklist
//! - `platforms` - Persisted, user-editable marketplace list
//! - `uploads` - Image storage for item photos and shipping labels

pub mod inventory;
pub mod platforms;
pub mod uploads;

pub use inventory::{
    InventoryError, InventoryListing, InventoryService, PassThroughMatcher, PhotoMatcher,
    ShippingEntry, ShippingWorklist, parse_item_id,
};
pub use platforms::{
    JsonFilePlatformRepository, MemoryPlatformRepository, PlatformRepository,
    PlatformService, PlatformServiceError, PlatformStoreError,
};
pub use uploads::{StoredUpload, UploadError, UploadStore};
