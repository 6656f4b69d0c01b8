//! Bintrack Core - shared domain types for the reseller inventory backend.
//!
//! Used by:
//! - `server` - HTTP API over the item store, uploads and platform list
//! - `cli` - migrations, demo data and the shipping worklist
//!
//! # Architecture
//!
//! Only types and pure functions live here: no I/O, no database access, no
//! HTTP. The item lifecycle rules are decided in this crate so every store
//! implementation applies them identically.
//!
//! # Modules
//!
//! - [`types`] - item IDs, status state machine, item model and patches,
//!   search filters, shipment urgency, and marketplace platforms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
