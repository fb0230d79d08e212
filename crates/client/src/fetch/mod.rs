//! HTTP collaborator for the response cache.
//!
//! A thin GET client that captures exactly the pieces the cache
//! persists: status, a collapsed header map, a charset hint, and the
//! raw body bytes. Rate limiting, retries, and proxy handling are the
//! caller's business, not this client's.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chorus_core::{AppConfig, Error, Fetch, FetchOutcome, RawResponse};
use reqwest::Client;
use tracing::debug;

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// User agent string (default: "chorus/0.1")
    pub user_agent: String,

    /// Request timeout (default: 30s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "chorus/0.1".to_string(),
            timeout: Duration::from_millis(30_000),
            max_redirects: 5,
        }
    }
}

/// GET fetcher backed by reqwest.
pub struct HttpFetcher {
    http: Client,
    config: HttpConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: HttpConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Build from the loaded application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(HttpConfig {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            ..HttpConfig::default()
        })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    fn name(&self) -> &str {
        "http_get"
    }

    /// GET the request URL.
    ///
    /// Non-2xx statuses are still outcomes, not errors: the status lands
    /// in the cache row, and callers that care inspect the reconstructed
    /// response.
    async fn call(&self, request: &str) -> Result<FetchOutcome, Error> {
        let response = self
            .http
            .get(request)
            .send()
            .await
            .map_err(|e| Error::Http(format!("network error: {e}")))?;

        let status = response.status().as_u16();
        let headers = collapse_headers(response.headers());
        let encoding = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, value)| charset_hint(value));

        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("failed to read response: {e}")))?;

        debug!(request, status, bytes = body.len(), "fetched");

        Ok(FetchOutcome::Response(RawResponse {
            status,
            headers,
            encoding,
            body: body.to_vec(),
        }))
    }
}

/// Flatten a header map to strings. Repeated headers keep the last
/// value; non-UTF-8 values are dropped.
fn collapse_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Pull a charset label out of a Content-Type value.
fn charset_hint(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_ascii_lowercase())
        } else {
            None
        }
    })
}
