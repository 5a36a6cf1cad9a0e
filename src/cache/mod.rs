//! Cache Module
//!
//! Provides the in-memory cache engine with time-based expiry.

mod engine;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use engine::{Cache, CacheOptions, SWEEP_INTERVAL};
pub use entry::{expire_in, CacheEntry};
pub use stats::CacheStats;
pub(crate) use stats::StatsCounters;
pub use store::CacheStore;
