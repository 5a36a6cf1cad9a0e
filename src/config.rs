//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_UPSTREAM_URL: &str = "https://api.github.com";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen: SocketAddr,
    /// Maximum number of `name` parameters accepted by `/users`
    pub max_limit: usize,
    /// Seconds a user fetched from upstream stays cached
    pub user_lifetime: u64,
    /// Default TTL in seconds for `PUT /set` without explicit TTL, 0 = never expires
    pub default_ttl: u64,
    /// Sweeper interval in seconds
    pub sweep_interval: u64,
    /// Reject expired entries on read instead of waiting for the sweeper
    pub lazy_expiry: bool,
    /// Verbose logging
    pub debug: bool,
    /// Bearer token sent to the upstream API
    pub token: Option<String>,
    /// Base URL of the upstream API
    pub upstream_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LISTEN` - Bind address (default: 0.0.0.0:3000)
    /// - `MAX_LIMIT` - Max names per `/users` request (default: 10)
    /// - `USER_LIFETIME` - Cached user lifetime in seconds (default: 60)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SWEEP_INTERVAL` - Sweeper frequency in seconds (default: 1)
    /// - `LAZY_EXPIRY` - Check expiry on read (default: false)
    /// - `DEBUG` - Verbose logging (default: false)
    /// - `GITHUB_TOKEN` - Upstream bearer token (default: unset)
    /// - `UPSTREAM_URL` - Upstream base URL (default: https://api.github.com)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen: parse_var("LISTEN").unwrap_or(defaults.listen),
            max_limit: parse_var("MAX_LIMIT").unwrap_or(defaults.max_limit),
            user_lifetime: parse_var("USER_LIFETIME").unwrap_or(defaults.user_lifetime),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            lazy_expiry: parse_var("LAZY_EXPIRY").unwrap_or(defaults.lazy_expiry),
            debug: parse_var("DEBUG").unwrap_or(defaults.debug),
            token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
        }
    }

    /// Sweeper period, never shorter than one second.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    /// TTL applied by `PUT /set` when the request carries none.
    pub fn default_ttl(&self) -> Option<u64> {
        (self.default_ttl > 0).then_some(self.default_ttl)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_limit: 10,
            user_lifetime: 60,
            default_ttl: 300,
            sweep_interval: 1,
            lazy_expiry: false,
            debug: false,
            token: None,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
        }
    }
}
