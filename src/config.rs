//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::collections::HashMap;
use std::env;

use tracing::warn;

use crate::cache::TtlPolicy;

/// Category TTLs used when `CACHE_TTLS` is not set.
pub const DEFAULT_CACHE_TTLS: &str = "companies=600000,documents=120000,search=60000";

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Fallback TTL in milliseconds
    pub default_ttl_ms: u64,
    /// Per-category TTLs in milliseconds
    pub category_ttls: HashMap<String, u64>,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Base URL of the document backend
    pub upstream_url: String,
    /// API key sent to the backend, if any
    pub upstream_api_key: Option<String>,
    /// Backend request timeout in seconds
    pub upstream_timeout: u64,
    /// Use strict single-flight fetching instead of best-effort
    pub coalesce_fetches: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL_MS` - Fallback TTL in milliseconds (default: 300000)
    /// - `CACHE_TTLS` - `category=ms` pairs, comma separated (default: [`DEFAULT_CACHE_TTLS`])
    /// - `CLEANUP_INTERVAL_SECS` - Cleanup frequency in seconds (default: 300)
    /// - `UPSTREAM_URL` - Backend base URL (default: http://localhost:8000)
    /// - `UPSTREAM_API_KEY` - Backend API key (default: unset)
    /// - `UPSTREAM_TIMEOUT_SECS` - Backend request timeout (default: 30)
    /// - `COALESCE_FETCHES` - `true`/`1` for single-flight fetching (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            default_ttl_ms: parse_var("DEFAULT_TTL_MS")
                .unwrap_or(defaults.default_ttl_ms),
            category_ttls: env::var("CACHE_TTLS")
                .map(|raw| parse_category_ttls(&raw))
                .unwrap_or(defaults.category_ttls),
            cleanup_interval: parse_var("CLEANUP_INTERVAL_SECS")
                .unwrap_or(defaults.cleanup_interval),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            upstream_api_key: env::var("UPSTREAM_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            coalesce_fetches: env::var("COALESCE_FETCHES")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.coalesce_fetches),
        }
    }

    /// Builds the store's TTL policy from this configuration.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy::from_parts(self.default_ttl_ms, self.category_ttls.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ttl_ms: 300_000,
            category_ttls: parse_category_ttls(DEFAULT_CACHE_TTLS),
            cleanup_interval: 300,
            upstream_url: "http://localhost:8000".to_string(),
            upstream_api_key: None,
            upstream_timeout: 30,
            coalesce_fetches: false,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Parses `category=ms` pairs separated by commas.
///
/// Malformed pairs are skipped with a warning.
pub fn parse_category_ttls(raw: &str) -> HashMap<String, u64> {
    let mut ttls = HashMap::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parsed = pair
            .split_once('=')
            .map(|(category, ms)| (category.trim(), ms.trim().parse::<u64>()));

        match parsed {
            Some((category, Ok(ms))) if !category.is_empty() => {
                ttls.insert(category.to_string(), ms);
            }
            _ => warn!("Ignoring malformed cache TTL entry '{}'", pair),
        }
    }

    ttls
}
