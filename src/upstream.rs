//! Upstream Client
//!
//! Fetches JSON from the document backend the gateway sits in front of.
//! Used as the producer for cache misses.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Header carrying the backend API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

// == Upstream Error ==
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure, timeout or undecodable body
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Path resolves outside the configured base URL
    #[error("path is outside the backend base URL: {0}")]
    InvalidPath(String),
}

// == Upstream Client ==
/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Builds a client with the configured base URL, API key and timeout.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        Self::new(
            &config.upstream_url,
            config.upstream_api_key.clone(),
            Duration::from_secs(config.upstream_timeout),
        )
    }

    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL for a backend path such as `companies?active=1`.
    ///
    /// The resolved URL must stay under the base URL's origin and path, so
    /// dot segments (encoded or not) cannot reach other backend routes.
    pub fn url_for(&self, path_and_query: &str) -> Result<Url, UpstreamError> {
        let invalid = || UpstreamError::InvalidPath(path_and_query.to_string());

        let base = Url::parse(&self.base_url).map_err(|_| invalid())?;
        let joined = format!(
            "{}/{}",
            self.base_url,
            path_and_query.trim_start_matches('/')
        );
        let url = Url::parse(&joined).map_err(|_| invalid())?;

        let base_path = base.path().trim_end_matches('/');
        let under_base = url.path() == base_path
            || url
                .path()
                .strip_prefix(base_path)
                .is_some_and(|rest| rest.starts_with('/'));
        if url.origin() != base.origin() || !under_base {
            return Err(invalid());
        }

        Ok(url)
    }

    // == Get JSON ==
    /// GETs `path_and_query` from the backend and decodes the JSON body.
    pub async fn get_json(&self, path_and_query: &str) -> Result<Value, UpstreamError> {
        let url = self.url_for(path_and_query)?;
        debug!("Upstream GET {}", url);

        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient::new(base, None, Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_url_for_joins_slashes() {
        let upstream = client("http://backend:8000/");

        assert_eq!(upstream.base_url(), "http://backend:8000");
        let url = upstream.url_for("companies").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/companies");

        let url = upstream.url_for("/documents/acme?page=2").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/documents/acme?page=2");
    }

    #[test]
    fn test_url_for_stays_under_base_path() {
        let upstream = client("http://backend:8000/api");

        let url = upstream.url_for("search/../companies").unwrap();
        assert_eq!(url.as_str(), "http://backend:8000/api/companies");

        for escaping in ["../admin", "%2e%2e/admin", "documents/../../admin", ".."] {
            let result = upstream.url_for(escaping);
            assert!(
                matches!(result, Err(UpstreamError::InvalidPath(_))),
                "{} should be rejected",
                escaping
            );
        }
    }

    #[test]
    fn test_url_for_rejects_sibling_prefix() {
        let upstream = client("http://backend:8000/api");

        // "/apix" shares the string prefix but is a different route
        assert!(upstream.url_for("../apix/secret").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            upstream_url: "http://example.test/api".into(),
            upstream_api_key: Some("secret".into()),
            ..Config::default()
        };

        let upstream = UpstreamClient::from_config(&config).unwrap();
        assert_eq!(upstream.base_url(), "http://example.test/api");
        assert_eq!(upstream.api_key.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let upstream = client("http://127.0.0.1:9");

        let result = upstream.get_json("companies").await;
        assert!(matches!(result, Err(UpstreamError::Request(_))));
    }
}
