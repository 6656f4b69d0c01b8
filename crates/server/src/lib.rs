//! Bintrack server library.
//!
//! The HTTP API for the reseller inventory backend, exposed as a library so
//! the binary, the CLI and the integration tests share one router and one set
//! of services.
//!
//! # Layout
//!
//! - [`config`] - environment configuration
//! - [`db`] - item stores (`PostgreSQL` and in-memory)
//! - [`services`] - inventory lifecycle and queries, platforms, uploads
//! - [`routes`] - axum handlers and the application router
//! - [`middleware`] - request IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
