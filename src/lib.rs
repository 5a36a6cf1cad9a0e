//! Shield Cache - an in-memory expiring cache in front of a rate-limited API
//!
//! The core is [`cache::Cache`]: a single reader/writer-locked map with a
//! background sweeper that purges expired entries. The HTTP layer exposes it
//! directly and uses it for cache-aside lookups against the upstream.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::{Cache, CacheEntry, CacheOptions};
pub use config::Config;
pub use error::{CacheError, Result};
