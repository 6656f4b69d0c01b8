//! Domain types for Bintrack.
//!
//! Everything here is plain data plus the rules that govern it; persistence
//! and transport live in `bintrack-server`.

pub mod filter;
pub mod id;
pub mod item;
pub mod platform;
pub mod status;
pub mod urgency;
pub mod validation;

pub use filter::{InventoryStats, ItemFilter, sort_newest_first};
pub use id::*;
pub use item::{InventoryItem, ItemChanges, ItemDraft, ItemPatch, NewItem, parse_ship_by_date};
pub use platform::{
    Platform, PlatformChanges, PlatformDraft, PlatformError, PlatformIcon, PlatformList,
    default_platforms, join_platforms, split_platforms,
};
pub use status::*;
pub use urgency::{Urgency, days_until, sort_for_shipping};
pub use validation::{ValidationError, require_non_empty};
