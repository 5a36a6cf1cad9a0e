//! Cache Engine
//!
//! The thread-safe handle callers use: a single reader/writer lock over the
//! store plus the sweeper that purges expired entries.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::cache::{CacheEntry, CacheStats, CacheStore, StatsCounters};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{Sweeper, SweeperState};

/// Period between two expiry sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Engine construction options.
#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
    /// Period between two sweeps
    pub sweep_interval: Duration,
    /// When set, `get` treats entries past their expiry as missing instead of
    /// serving them until the next sweep
    pub lazy_expiry: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            sweep_interval: SWEEP_INTERVAL,
            lazy_expiry: false,
        }
    }
}

impl From<&Config> for CacheOptions {
    fn from(config: &Config) -> Self {
        Self {
            sweep_interval: config.sweep_period(),
            lazy_expiry: config.lazy_expiry,
        }
    }
}

/// In-memory key-value cache with time-based expiry.
///
/// `get` takes the lock in shared mode; `set`, `delete`, `clear` and the
/// sweeper take it exclusively. No lock is held across an `.await`.
///
/// By default expiry is enforced only by the sweeper, so an entry past its
/// `expire_at` stays visible for at most one sweep interval.
#[derive(Debug)]
pub struct Cache {
    store: Arc<RwLock<CacheStore>>,
    stats: Arc<StatsCounters>,
    lazy_expiry: bool,
    sweeper: Sweeper,
}

impl Cache {
    /// Creates an empty cache sweeping every [`SWEEP_INTERVAL`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        Self::with_options(CacheOptions::default())
    }

    /// Creates an empty cache with explicit sweep interval and expiry policy.
    pub fn with_options(options: CacheOptions) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new()));
        let stats = Arc::new(StatsCounters::default());
        let sweeper = Sweeper::spawn(store.clone(), stats.clone(), options.sweep_interval);

        Self {
            store,
            stats,
            lazy_expiry: options.lazy_expiry,
            sweeper,
        }
    }

    /// Creates an empty cache tuned by `SWEEP_INTERVAL` and `LAZY_EXPIRY`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_options(CacheOptions::from(config))
    }

    // == Get ==
    /// Returns the value and expiry stored under `key`.
    pub fn get(&self, key: &str) -> Result<CacheEntry> {
        let found = self.store.read().get(key).cloned();

        let entry = match found {
            Ok(entry) => entry,
            Err(err) => {
                self.stats.record_miss();
                return Err(err);
            }
        };

        if self.lazy_expiry {
            let now = Utc::now();
            if entry.is_expired_at(now) {
                if self.store.write().remove_if_expired(key, now) {
                    self.stats.record_expired(1);
                }
                self.stats.record_miss();
                return Err(CacheError::NotFound(key.to_string()));
            }
        }

        self.stats.record_hit();
        Ok(entry)
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        expire_at: Option<DateTime<Utc>>,
    ) {
        let (key, value) = (key.into(), value.into());
        self.store.write().set(key, value, expire_at);
    }

    // == Delete ==
    pub fn delete(&self, key: &str) -> Result<()> {
        self.store.write().delete(key).map(|_| ())
    }

    // == Clear ==
    /// Drops every entry by swapping in a fresh store.
    pub fn clear(&self) {
        let old = std::mem::take(&mut *self.store.write());
        drop(old);
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Snapshot of the hit, miss, expiry and sweep counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    /// Current lifecycle state of the background sweeper.
    pub fn sweeper_state(&self) -> SweeperState {
        self.sweeper.state()
    }

    /// Stops the sweeper and waits for it to exit.
    ///
    /// The cache stays usable afterwards, but expired entries are no longer
    /// purged in the background.
    pub async fn close(&self) {
        self.sweeper.shutdown().await;
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
