//! GitHub user directory over HTTP.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT};
use tracing::{debug, warn};

use super::{PublicUser, RateLimit, UserDirectory};
use crate::config::Config;
use crate::error::{CacheError, Result};

const USER_AGENT_VALUE: &str = concat!("shield_cache/", env!("CARGO_PKG_VERSION"));

/// Client for the `/users/{login}` endpoint of the GitHub REST API.
#[derive(Debug)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    rate_limit: Mutex<Option<RateLimit>>,
}

impl GithubClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            rate_limit: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.upstream_url.clone(), config.token.clone())
    }

    /// Builds `{base}/users/{login}` with `login` encoded as one path segment.
    fn user_url(&self, login: &str) -> Result<reqwest::Url> {
        if login.is_empty() || login == "." || login == ".." {
            return Err(CacheError::InvalidRequest(format!(
                "invalid user name '{}'",
                login
            )));
        }

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|err| {
            CacheError::Upstream(format!("invalid upstream url '{}': {}", self.base_url, err))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CacheError::Upstream(format!("upstream url '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .push("users")
            .push(login);

        Ok(url)
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        if let Some(rate) = parse_rate_limit(headers) {
            debug!(
                limit = rate.limit,
                remaining = rate.remaining,
                reset = rate.reset,
                "upstream rate limit"
            );
            *self.rate_limit.lock() = Some(rate);
        }
    }
}

#[async_trait]
impl UserDirectory for GithubClient {
    async fn get_user(&self, login: &str) -> Result<PublicUser> {
        let mut request = self
            .client
            .get(self.user_url(login)?)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        self.record_rate_limit(response.headers());

        let status = response.status();
        if !status.is_success() {
            warn!(login, status = status.as_u16(), "upstream user lookup failed");
            return Err(CacheError::Upstream(format!(
                "lookup of '{}' returned {}",
                login, status
            )));
        }

        Ok(response.json::<PublicUser>().await?)
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        *self.rate_limit.lock()
    }
}

/// Reads the `X-RateLimit-*` headers. Missing or malformed values read as 0;
/// returns None when none of the three headers is present.
fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimit> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    let (limit, remaining, reset) = (
        read("x-ratelimit-limit"),
        read("x-ratelimit-remaining"),
        read("x-ratelimit-reset"),
    );

    if limit.is_none() && remaining.is_none() && reset.is_none() {
        return None;
    }

    Some(RateLimit {
        limit: limit.unwrap_or_default(),
        remaining: remaining.unwrap_or_default(),
        reset: reset.unwrap_or_default(),
    })
}
