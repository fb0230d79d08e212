//! The cached-fetch adapter.
//!
//! Wraps any fetch operation with a read-through, write-back store
//! keyed by the fully-built request URL. On a hit the underlying fetch
//! is never invoked; on a miss the result is classified, persisted, and
//! answered from the just-computed fields.

use async_trait::async_trait;
use chrono::Utc;
use std::future::Future;
use tracing::debug;

use super::connection::CacheDb;
use super::entry::CacheEntry;
use super::outcome::FetchOutcome;
use super::payload::Payload;
use super::response::CachedResponse;
use crate::Error;

/// An idempotent fetch operation the cache can wrap.
///
/// The request key doubles as the fetch argument. Any other knobs
/// (credentials, timeouts, politeness delays) belong to the implementor
/// and never participate in the cache key.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Perform the fetch for a request key.
    async fn call(&self, request: &str) -> Result<FetchOutcome, Error>;

    /// Diagnostic name recorded as `func_name` on entries this fetcher
    /// produces.
    fn name(&self) -> &str {
        "fetch"
    }
}

#[async_trait]
impl<F, Fut> Fetch for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchOutcome, Error>> + Send,
{
    async fn call(&self, request: &str) -> Result<FetchOutcome, Error> {
        self(request.to_string()).await
    }
}

/// Per-call behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Skip the lookup and always re-invoke the underlying fetch,
    /// overwriting the stored entry.
    pub force_refresh: bool,
}

/// Read-through cache around a [`Fetch`] implementation.
///
/// The store handle is passed in explicitly; there is no process-global
/// connection. Lookup and upsert are each atomic, but the overall
/// check-fetch-insert sequence is not: two concurrent callers may both
/// fetch an uncached key, and the later write wins. The wrapped fetches
/// are idempotent network reads, so the duplicate work is harmless. No
/// row is held locked across the network fetch.
#[derive(Debug, Clone)]
pub struct CachedFetcher<F> {
    db: CacheDb,
    fetcher: F,
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(db: CacheDb, fetcher: F) -> Self {
        Self { db, fetcher }
    }

    /// The parsed value for a request: served from the store when
    /// present, fetched and persisted otherwise.
    pub async fn get(&self, request: &str) -> Result<Payload, Error> {
        self.get_with(request, FetchOptions::default()).await
    }

    pub async fn get_with(&self, request: &str, options: FetchOptions) -> Result<Payload, Error> {
        let entry = self.load(request, options).await?;
        Payload::decode(&entry.body, entry.format)
    }

    /// Like [`CachedFetcher::get`], but shaped as an HTTP response for
    /// callers that expect status, headers, and a body accessor
    /// whether the data came from the store or a live call.
    pub async fn get_response(&self, request: &str) -> Result<CachedResponse, Error> {
        self.get_response_with(request, FetchOptions::default()).await
    }

    pub async fn get_response_with(
        &self,
        request: &str,
        options: FetchOptions,
    ) -> Result<CachedResponse, Error> {
        let entry = self.load(request, options).await?;
        CachedResponse::rebuild(&entry)
    }

    /// The underlying store handle.
    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    async fn load(&self, request: &str, options: FetchOptions) -> Result<CacheEntry, Error> {
        if !options.force_refresh
            && let Some(entry) = self.db.get_entry(request).await?
        {
            debug!(request, "cache hit");
            return Ok(entry);
        }

        debug!(request, force_refresh = options.force_refresh, "cache miss, fetching");
        let outcome = self.fetcher.call(request).await?;

        let (content_type, encoding, status_code, headers) = match &outcome {
            FetchOutcome::Response(response) => (
                response.content_type().map(str::to_string),
                response.encoding.clone(),
                Some(response.status as i32),
                Some(serde_json::to_string(&response.headers)?),
            ),
            _ => (None, None, None, None),
        };

        let (body, format) = outcome.encode();

        let entry = CacheEntry {
            request: request.to_string(),
            func_name: Some(self.fetcher.name().to_string()),
            body,
            format,
            content_type,
            encoding,
            status_code,
            headers,
            timestamp: Utc::now().to_rfc3339(),
        };

        self.db.upsert_entry(&entry).await?;

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::format::PayloadFormat;
    use crate::cache::outcome::RawResponse;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn json_response(body: &[u8]) -> FetchOutcome {
        FetchOutcome::Response(RawResponse {
            status: 200,
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            encoding: Some("utf-8".to_string()),
            body: body.to_vec(),
        })
    }

    fn counting_fetcher(calls: Arc<AtomicUsize>, outcome: FetchOutcome) -> impl Fetch {
        move |_request: String| {
            let calls = calls.clone();
            let outcome = outcome.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(outcome)
            }
        }
    }

    #[tokio::test]
    async fn test_json_miss_then_hit() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CachedFetcher::new(
            db,
            counting_fetcher(calls.clone(), json_response(br#"{"artists":[{"name":"X"}]}"#)),
        );

        let url = "https://musicbrainz.org/ws/2/artist/?query=name:%22X%22&fmt=json";
        let expected = Payload::Json(json!({"artists": [{"name": "X"}]}));

        let first = fetcher.get(url).await.unwrap();
        assert_eq!(first, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stored = fetcher.db().get_entry(url).await.unwrap().unwrap();
        assert_eq!(stored.format, PayloadFormat::Json);
        assert_eq!(stored.status_code, Some(200));

        let second = fetcher.get(url).await.unwrap();
        assert_eq!(second, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "hit must not invoke the fetch");
    }

    #[tokio::test]
    async fn test_force_refresh_always_fetches() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CachedFetcher::new(db, counting_fetcher(calls.clone(), json_response(b"{}")));

        let url = "https://example.com/api";
        fetcher.get(url).await.unwrap();
        fetcher
            .get_with(url, FetchOptions { force_refresh: true })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.db().entry_count().await.unwrap(), 1, "refresh overwrites, never duplicates");
    }

    #[tokio::test]
    async fn test_response_reconstruction_identical_on_miss_and_hit() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CachedFetcher::new(db, counting_fetcher(calls.clone(), json_response(br#"{"a":1}"#)));

        let url = "https://example.com/api";
        let miss = fetcher.get_response(url).await.unwrap();
        let hit = fetcher.get_response(url).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(miss.status(), hit.status());
        assert_eq!(miss.headers(), hit.headers());
        assert_eq!(miss.text(), hit.text());
        assert_eq!(miss.url(), url);
        assert_eq!(hit.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_binary_payload_survives_round_trip() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec();
        let fetcher = CachedFetcher::new(db, counting_fetcher(calls.clone(), FetchOutcome::Binary(png.clone())));

        let url = "https://example.com/cover.png";
        fetcher.get(url).await.unwrap();

        let stored = fetcher.db().get_entry(url).await.unwrap().unwrap();
        assert_eq!(stored.format, PayloadFormat::Bytes);

        let hit = fetcher.get(url).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(hit.as_bytes(), Some(&png[..]));
    }

    #[tokio::test]
    async fn test_structured_value_cached_as_json() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CachedFetcher::new(
            db,
            counting_fetcher(calls.clone(), FetchOutcome::Structured(json!({"listeners": "123"}))),
        );

        fetcher.get("https://example.com/stats").await.unwrap();
        let hit = fetcher.get("https://example.com/stats").await.unwrap();

        assert_eq!(hit, Payload::Json(json!({"listeners": "123"})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_nested_key_is_not_a_cache_failure() {
        // The fetch returns a document without the keys a caller might
        // expect; the cache stores and returns it unchanged.
        let db = CacheDb::open_in_memory().await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CachedFetcher::new(
            db,
            counting_fetcher(calls.clone(), json_response(br#"{"artist":{"name":"X"}}"#)),
        );

        let payload = fetcher.get("https://example.com/info").await.unwrap();
        assert_eq!(payload, Payload::Json(json!({"artist": {"name": "X"}})));
        assert_eq!(fetcher.db().entry_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fallback_value_reconstructs_as_synthetic_response() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = CachedFetcher::new(
            db,
            |_request: String| async move {
                Ok::<_, Error>(FetchOutcome::Other { text: "plain value".to_string(), content_type: None })
            },
        );

        for _ in 0..2 {
            let response = fetcher.get_response("https://example.com/odd").await.unwrap();
            assert_eq!(response.status(), 200);
            assert!(response.headers().is_empty());
            assert_eq!(response.text(), "plain value");
        }
    }

    #[tokio::test]
    async fn test_fetch_error_writes_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = CachedFetcher::new(
            db,
            |_request: String| async move {
                Err::<FetchOutcome, _>(Error::Http("connection refused".to_string()))
            },
        );

        let result = fetcher.get("https://example.com/down").await;
        assert!(matches!(result, Err(Error::Http(_))));
        assert_eq!(fetcher.db().entry_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_stored_headers_fail_loudly_on_response_path() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = CacheEntry {
            request: "https://example.com/bad".to_string(),
            func_name: None,
            body: "{}".to_string(),
            format: PayloadFormat::Json,
            content_type: Some("application/json".to_string()),
            encoding: None,
            status_code: Some(200),
            headers: Some("{truncated".to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        db.upsert_entry(&entry).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CachedFetcher::new(db, counting_fetcher(calls.clone(), json_response(b"{}")));

        let result = fetcher.get_response("https://example.com/bad").await;
        assert!(matches!(result, Err(Error::CorruptEntry { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "a hit must not invoke the fetch, even a corrupt one");

        // The auto path never touches the header blob.
        let payload = fetcher.get("https://example.com/bad").await.unwrap();
        assert_eq!(payload, Payload::Json(json!({})));
    }

    #[tokio::test]
    async fn test_func_name_recorded() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = CachedFetcher::new(db, |_request: String| async move {
            Ok::<_, Error>(FetchOutcome::Structured(json!(null)))
        });

        fetcher.get("https://example.com/x").await.unwrap();
        let stored = fetcher.db().get_entry("https://example.com/x").await.unwrap().unwrap();
        assert_eq!(stored.func_name.as_deref(), Some("fetch"));
    }
}
