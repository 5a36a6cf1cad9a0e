//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds (uses the configured default if absent)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Query string of `GET /users`, e.g. `?name=a&name=b`.
///
/// Parameters other than `name` are ignored.
#[derive(Debug, Clone, Default)]
pub struct UsersQuery {
    pub names: Vec<String>,
}

impl UsersQuery {
    /// Collects every `name` parameter from decoded query pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let names = pairs
            .into_iter()
            .filter(|(k, _)| k == "name")
            .map(|(_, v)| v)
            .collect();
        Self { names }
    }

    /// Checks presence, the per-request limit, and that every name is usable
    /// as a single path segment.
    pub fn validate(&self, max_limit: usize) -> Option<String> {
        if self.names.is_empty() {
            return Some("name required".to_string());
        }
        if self
            .names
            .iter()
            .any(|name| name.trim().is_empty() || name == "." || name == "..")
        {
            return Some("name cannot be empty".to_string());
        }
        if self.names.len() > max_limit {
            return Some(format!(
                "the limit for accepted has been reached: {}",
                max_limit
            ));
        }
        None
    }
}
