//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with optional expiry.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// A stored value plus its optional expiry timestamp.
///
/// The payload is opaque and never mutated in place; an update replaces the
/// whole entry. Cloning is cheap since `Bytes` is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Bytes,
    /// Expiration timestamp, None = no expiration
    pub expire_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring at `expire_at`, or never.
    pub fn new(value: impl Into<Bytes>, expire_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expire_at,
        }
    }

    /// Creates an entry that expires `ttl_seconds` from now.
    pub fn with_ttl(value: impl Into<Bytes>, ttl_seconds: u64) -> Self {
        Self::new(value, Some(expire_in(ttl_seconds)))
    }

    // == Is Expired ==
    /// Checks if the entry is stale at `now`.
    ///
    /// Only strictly past timestamps count: an entry whose `expire_at` equals
    /// `now` is still live.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_at, Some(expire_at) if now > expire_at)
    }

    /// Checks if the entry is stale against the current wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    // == Time To Live ==
    /// Returns remaining TTL in whole seconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_seconds)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.expire_at.map(|expire_at| {
            let remaining = expire_at - Utc::now();
            remaining.num_seconds().max(0) as u64
        })
    }
}

// == Utility Functions ==
/// Returns the timestamp `seconds` from now.
pub fn expire_in(seconds: u64) -> DateTime<Utc> {
    let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
    let delta = Duration::try_seconds(seconds).unwrap_or(Duration::MAX);
    Utc::now()
        .checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
