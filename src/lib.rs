//! Drag-and-drop reordering of the images attached to content entries.
//!
//! The library exposes the store, the reordering controller and the HTTP
//! router for integration testing. The `rei` binary wires them together.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod nonce;
pub mod reorder;

/// Crate version, appended to asset URLs for cache busting.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
