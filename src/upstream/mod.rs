//! Upstream Module
//!
//! The rate-limited API the cache shields, behind the [`UserDirectory`] trait.

mod github;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use github::GithubClient;

/// Rate-limit counters reported by the upstream on its last response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: i64,
    pub remaining: i64,
    /// Unix seconds at which the window resets
    pub reset: i64,
}

/// Public profile of a user as served by the upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
}

/// Source of user profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches the profile for `login`.
    async fn get_user(&self, login: &str) -> Result<PublicUser>;

    /// Last known rate-limit state, if any response has been seen.
    fn rate_limit(&self) -> Option<RateLimit>;
}
