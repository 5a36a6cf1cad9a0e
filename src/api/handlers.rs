//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{debug, warn};

use crate::cache::{expire_in, Cache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse, UsersQuery,
};
use crate::upstream::{GithubClient, PublicUser, RateLimit, UserDirectory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache engine
    pub cache: Arc<Cache>,
    /// Upstream the cache shields
    pub users: Arc<dyn UserDirectory>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(cache: Arc<Cache>, users: Arc<dyn UserDirectory>, config: Config) -> Self {
        Self {
            cache,
            users,
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the cache (and its sweeper) and builds the GitHub client.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(Cache::from_config(config)),
            Arc::new(GithubClient::from_config(config)),
            config.clone(),
        )
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.or_else(|| state.config.default_ttl());
    state
        .cache
        .set(req.key.clone(), req.value, ttl.map(expire_in));

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let entry = state.cache.get(&key)?;

    Ok(Json(GetResponse::new(key, &entry)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    debug!("cache cleared");

    Json(ClearResponse::new())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /users?name=...
///
/// Serves each requested user from the cache, falling back to the upstream
/// and caching the result for `user_lifetime` seconds. Names are sorted.
pub async fn users_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<PublicUser>>> {
    let mut query = UsersQuery::from_pairs(pairs);
    if let Some(error_msg) = query.validate(state.config.max_limit) {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    query.names.sort();

    let mut users = Vec::with_capacity(query.names.len());
    for name in &query.names {
        users.push(lookup_user(&state, name).await?);
    }

    Ok(Json(users))
}

/// Handler for GET /rate_limit
pub async fn rate_limit_handler(State(state): State<AppState>) -> Json<Option<RateLimit>> {
    Json(state.users.rate_limit())
}

async fn lookup_user(state: &AppState, login: &str) -> Result<PublicUser> {
    let key = user_key(login);

    if let Ok(entry) = state.cache.get(&key) {
        match serde_json::from_slice(&entry.value) {
            Ok(user) => {
                debug!(login, "user served from cache");
                return Ok(user);
            }
            Err(err) => warn!(login, "discarding undecodable cached user: {}", err),
        }
    }

    let user = state.users.get_user(login).await?;
    let body = serde_json::to_vec(&user)?;
    state
        .cache
        .set(key, body, Some(expire_in(state.config.user_lifetime)));

    Ok(user)
}

/// Cache key a looked-up user is stored under.
pub fn user_key(login: &str) -> String {
    format!("user:{}", login)
}
