//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Expiry Sweeper: removes expired cache entries on a fixed interval

mod sweeper;

pub use sweeper::{Sweeper, SweeperState, MAX_SWEEP_INTERVAL, MIN_SWEEP_INTERVAL};
