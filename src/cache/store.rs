//! Cache Store Module
//!
//! The unsynchronized map behind the engine. All locking happens one level up
//! in [`Cache`](crate::cache::Cache); every method here is a single short,
//! synchronous map operation.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Key to entry mapping, indexed directly by the caller's key.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the entry for `key` verbatim, expired or not.
    pub fn get(&self, key: &str) -> Result<&CacheEntry> {
        self.entries
            .get(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Set ==
    /// Inserts or replaces the entry for `key`.
    pub fn set(&mut self, key: String, value: Bytes, expire_at: Option<DateTime<Utc>>) {
        self.entries.insert(key, CacheEntry::new(value, expire_at));
    }

    // == Delete ==
    /// Removes the entry for `key`.
    pub fn delete(&mut self, key: &str) -> Result<CacheEntry> {
        self.entries
            .remove(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    /// Removes `key` only if it is still expired at `now`.
    ///
    /// Used by read-time expiry, which must re-validate after trading its read
    /// lock for a write lock.
    pub fn remove_if_expired(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.entries.remove(key);
                true
            }
            _ => false,
        }
    }

    // == Purge Expired ==
    /// Removes every entry whose expiry is strictly before `now`.
    ///
    /// Returns the number of entries removed. Entries without expiry are kept.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
