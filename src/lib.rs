//! Admin Cache - TTL cache store and caching gateway
//!
//! Provides a key/value store with per-category TTL, lazy expiry on read,
//! periodic cleanup and get-or-fetch, plus an HTTP gateway that fronts the
//! document backend with it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::{CacheStore, SharedCache, TtlPolicy};
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_cleanup_task;
