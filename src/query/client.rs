//! Resilient client for the distributed query engine
//!
//! Every fetch is bounded by a per-attempt timeout and retried with an
//! exponential backoff clamped to the policy's bounds. Exhausting the
//! retries is fatal and propagates to the caller; this is the one place
//! in the crate where a remote failure is not degraded away.

use std::collections::BTreeSet;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::Url;

use super::table::{cell_to_string, RawResult};

/// Timeout, retry, and backoff bounds for query execution.
///
/// Immutable, resolved once at startup. `max_retries` counts re-attempts
/// after the initial request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Re-attempts after the first failure
    pub max_retries: usize,
    /// Smallest delay between attempts
    pub min_backoff: Duration,
    /// Largest delay between attempts
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_retries: 4,
            min_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Map the policy onto a backoff builder. The growth curve between the
    /// clamps is backon's; the contract here is the bounds and the count.
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_backoff)
            .with_max_delay(self.max_backoff)
            .with_max_times(self.max_retries)
    }
}

/// Query engine errors
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Query request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Query returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Query response decode failed: {0}")]
    Decode(String),

    #[error("Query URL is invalid: {0}")]
    Url(String),

    #[error("Counting query returned {0} distinct results")]
    AmbiguousCount(usize),

    #[error("Counting query returned a non-numeric result: {0}")]
    MalformedCount(String),
}

/// Client for executing query URLs with retry and backoff
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl QueryClient {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(policy.timeout)
                .build()
                .expect("Failed to create HTTP client"),
            policy,
        }
    }

    /// Fetch a URL expected to answer with a JSON 2-D array.
    pub async fn fetch_rows(&self, url: Url) -> Result<RawResult, QueryError> {
        let rows = self.fetch_array(&url).await?;
        Ok(RawResult::new(rows))
    }

    /// Fetch a URL expected to answer with a flat array of scalars.
    ///
    /// The textual forms are collected into an ordered set, so any
    /// downstream choice among them is deterministic.
    pub async fn fetch_scalar_set(&self, url: Url) -> Result<BTreeSet<String>, QueryError> {
        let items = self.fetch_array(&url).await?;
        Ok(items.iter().map(cell_to_string).collect())
    }

    /// Fetch a counting query's single numeric result.
    ///
    /// An empty result set counts as zero; more than one distinct value is
    /// an error rather than an arbitrary pick.
    pub async fn fetch_count(&self, url: Url) -> Result<i64, QueryError> {
        let set = self.fetch_scalar_set(url.clone()).await?;
        match set.len() {
            0 => {
                tracing::warn!(url = %url, "Counting query found no data; returning zero");
                Ok(0)
            }
            1 => {
                let raw = set.iter().next().map(String::as_str).unwrap_or_default();
                parse_count_value(raw)
            }
            n => Err(QueryError::AmbiguousCount(n)),
        }
    }

    async fn fetch_array(&self, url: &Url) -> Result<Vec<serde_json::Value>, QueryError> {
        (|| async { self.attempt(url.clone()).await })
            .retry(self.policy.backoff())
            .notify(|err: &QueryError, dur: Duration| {
                tracing::warn!(
                    error = %err,
                    "Query attempt failed. Retrying in {:.1}s",
                    dur.as_secs_f32()
                );
            })
            .await
    }

    async fn attempt(&self, url: Url) -> Result<Vec<serde_json::Value>, QueryError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(QueryError::Status(response.status()));
        }
        let body: serde_json::Value = response.json().await?;
        match body {
            serde_json::Value::Array(rows) => Ok(rows),
            other => Err(QueryError::Decode(format!(
                "expected a JSON array, got: {}",
                other
            ))),
        }
    }
}

/// Decode one scalar result as a singleton JSON array or a bare integer.
fn parse_count_value(raw: &str) -> Result<i64, QueryError> {
    let malformed = || QueryError::MalformedCount(raw.to_string());
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|_| malformed())?;
    match value {
        serde_json::Value::Number(n) => n.as_i64().ok_or_else(malformed),
        serde_json::Value::Array(items) if items.len() == 1 => {
            items[0].as_i64().ok_or_else(malformed)
        }
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(2),
            max_retries: 3,
            min_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(20),
        }
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn url_for(addr: SocketAddr) -> Url {
        Url::parse(&format!("http://{}/query/call", addr)).unwrap()
    }

    #[test]
    fn test_parse_count_value() {
        assert_eq!(parse_count_value("[42]").unwrap(), 42);
        assert_eq!(parse_count_value("42").unwrap(), 42);
        assert!(matches!(
            parse_count_value("[1,2]"),
            Err(QueryError::MalformedCount(_))
        ));
        assert!(matches!(
            parse_count_value("nonsense"),
            Err(QueryError::MalformedCount(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_rows() {
        let app = Router::new().route(
            "/query/call",
            get(|| async { Json(json!([["h1", "h2"], ["a", "b"]])) }),
        );
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        let raw = client.fetch_rows(url_for(addr)).await.unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.cells(0).unwrap(), vec!["h1", "h2"]);
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler_hits = Arc::clone(&hits);
        let app = Router::new().route(
            "/query/call",
            get(move || {
                let hits = Arc::clone(&handler_hits);
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    } else {
                        Json(json!([["h1"], ["a"]])).into_response()
                    }
                }
            }),
        );
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        let raw = client.fetch_rows(url_for(addr)).await.unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler_hits = Arc::clone(&hits);
        let app = Router::new().route(
            "/query/call",
            get(move || {
                let hits = Arc::clone(&handler_hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE.into_response()
                }
            }),
        );
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        let err = client.fetch_rows(url_for(addr)).await.unwrap_err();
        assert!(matches!(err, QueryError::Status(_)));
        // initial attempt plus max_retries re-attempts
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fetch_scalar_set_is_ordered() {
        let app = Router::new().route(
            "/query/call",
            get(|| async { Json(json!(["[9]", "[1]", "[5]"])) }),
        );
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        let set = client.fetch_scalar_set(url_for(addr)).await.unwrap();
        let items: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(items, vec!["[1]", "[5]", "[9]"]);
    }

    #[tokio::test]
    async fn test_fetch_count() {
        let app = Router::new().route("/query/call", get(|| async { Json(json!(["[42]"])) }));
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        assert_eq!(client.fetch_count(url_for(addr)).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_fetch_count_empty_is_zero() {
        let app = Router::new().route("/query/call", get(|| async { Json(json!([])) }));
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        assert_eq!(client.fetch_count(url_for(addr)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fetch_count_ambiguous() {
        let app = Router::new().route(
            "/query/call",
            get(|| async { Json(json!(["[1]", "[2]"])) }),
        );
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        let err = client.fetch_count(url_for(addr)).await.unwrap_err();
        assert!(matches!(err, QueryError::AmbiguousCount(2)));
    }

    #[tokio::test]
    async fn test_non_array_body_is_decode_error() {
        let app = Router::new().route(
            "/query/call",
            get(|| async { Json(json!({"rows": []})) }),
        );
        let addr = serve(app).await;

        let client = QueryClient::new(test_policy());
        let err = client.fetch_rows(url_for(addr)).await.unwrap_err();
        assert!(matches!(err, QueryError::Decode(_)));
    }
}
