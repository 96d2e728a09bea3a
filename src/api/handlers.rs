//! API Handlers
//!
//! HTTP request handlers for the cached passthrough and cache administration.

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap},
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{validate_key, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    EntriesResponse, EntryResponse, HealthResponse, InvalidateQuery, RemovedResponse,
    SetEntryRequest, SetResponse, SetTtlRequest, StatsResponse, TtlResponse,
};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub cache: SharedCache,
    /// Backend client used to fill cache misses
    pub upstream: UpstreamClient,
    /// Route misses through single-flight fetching
    pub coalesce_fetches: bool,
}

impl AppState {
    pub fn new(cache: SharedCache, upstream: UpstreamClient) -> Self {
        Self {
            cache,
            upstream,
            coalesce_fetches: false,
        }
    }

    /// Switches misses to single-flight fetching.
    pub fn with_coalescing(mut self, enabled: bool) -> Self {
        self.coalesce_fetches = enabled;
        self
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, UpstreamError> {
        let cache = SharedCache::new(CacheStore::new(config.ttl_policy()));
        let upstream = UpstreamClient::from_config(config)?;
        let state = Self::new(cache, upstream);
        Ok(state.with_coalescing(config.coalesce_fetches))
    }
}

/// Builds the cache key for a passthrough request: path plus query, if any.
pub fn passthrough_key(path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    }
}

/// Rejects `.` and `..` segments, which would resolve outside the backend
/// base path once joined onto it.
fn check_passthrough_path(path: &str) -> Result<()> {
    if path
        .split(['/', '\\'])
        .any(|segment| segment == "." || segment == "..")
    {
        return Err(CacheError::InvalidRequest(
            "Path may not contain '.' or '..' segments".to_string(),
        ));
    }
    Ok(())
}

fn wants_refresh(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.to_ascii_lowercase().contains("no-cache"))
}

/// Handler for GET /api/*path
///
/// Answers from the cache when fresh, otherwise fetches the same path from
/// the backend and caches the JSON body. `Cache-Control: no-cache` forces a
/// refetch. Requests too long to be a cache key are forwarded uncached.
pub async fn passthrough_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    check_passthrough_path(&path)?;
    let key = passthrough_key(&path, query.as_deref());

    if let Err(err) = validate_key(&key) {
        debug!(len = key.len(), "Not cacheable ({}), bypassing cache", err);
        return Ok(Json(state.upstream.get_json(&key).await?));
    }

    if wants_refresh(&headers) && state.cache.invalidate(&key).await {
        debug!(key = %key, "Refresh requested, cached entry dropped");
    }

    let upstream = state.upstream.clone();
    let upstream_path = key.clone();
    let producer = move || async move {
        upstream
            .get_json(&upstream_path)
            .await
            .map_err(CacheError::from)
    };

    let value = if state.coalesce_fetches {
        state.cache.get_or_fetch_coalesced(&key, producer).await?
    } else {
        state.cache.get_or_fetch(&key, producer).await?
    };

    Ok(Json(value))
}

/// Handler for GET /cache/entries
pub async fn list_entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    Json(EntriesResponse::new(state.cache.entries().await))
}

/// Handler for GET /cache/entries/*key
///
/// Stale entries answer 404 like missing ones.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>> {
    let value = state
        .cache
        .get(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(EntryResponse::new(key, value)))
}

/// Handler for PUT /cache/entries
pub async fn set_entry_handler(
    State(state): State<AppState>,
    Json(req): Json<SetEntryRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set(&req.key, req.value, req.ttl_ms).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for DELETE /cache/entries/*key
///
/// Always succeeds; `removed` is 0 when the key was not stored.
pub async fn invalidate_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<RemovedResponse> {
    let removed = state.cache.invalidate(&key).await;
    Json(RemovedResponse::new(usize::from(removed)))
}

/// Handler for DELETE /cache
///
/// With `?prefix=` only matching keys are dropped; without it the store is
/// cleared.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<InvalidateQuery>,
) -> Json<RemovedResponse> {
    let removed = match query.prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => {
            let removed = state.cache.invalidate_prefix(&prefix).await;
            info!("Invalidated {} entries with prefix '{}'", removed, prefix);
            removed
        }
        None => {
            let removed = state.cache.clear().await;
            info!("Cache cleared ({} entries)", removed);
            removed
        }
    };

    Json(RemovedResponse::new(removed))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    Json(RemovedResponse::new(state.cache.cleanup_expired().await))
}

/// Handler for PUT /cache/ttl
pub async fn set_ttl_handler(
    State(state): State<AppState>,
    Json(req): Json<SetTtlRequest>,
) -> Result<Json<TtlResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache.set_ttl(&req.category, req.ttl_ms).await;
    info!(
        "TTL for category '{}' set to {}ms",
        req.category, req.ttl_ms
    );

    Ok(Json(TtlResponse {
        category: req.category,
        ttl_ms: req.ttl_ms,
    }))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
