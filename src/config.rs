//! Process-wide configuration
//!
//! Resolved once at startup and passed by value into the components that
//! need it; nothing reads the environment after construction.

use std::time::Duration;

use crate::query::RetryPolicy;

/// Query-engine endpoint and retry settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Host of the query engine's web frontend
    pub query_host: String,
    /// Port of the query engine's web frontend
    pub query_port: u16,
    /// Timeout/retry/backoff bounds for query execution
    pub retry: RetryPolicy,
}

impl Settings {
    /// Read settings from the environment.
    ///
    /// - `LOOKOUT_QUERY_HOST` (default `127.0.0.1`)
    /// - `LOOKOUT_QUERY_PORT` (default `2222`)
    /// - `LOOKOUT_QUERY_TIMEOUT_MS` (default `20000`)
    /// - `LOOKOUT_QUERY_RETRIES` (default `4`)
    /// - `LOOKOUT_QUERY_BACKOFF_MIN_MS` (default `10000`)
    /// - `LOOKOUT_QUERY_BACKOFF_MAX_MS` (default `120000`)
    pub fn from_env() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            query_host: std::env::var("LOOKOUT_QUERY_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            query_port: env_parsed("LOOKOUT_QUERY_PORT").unwrap_or(2222),
            retry: RetryPolicy {
                timeout: env_millis("LOOKOUT_QUERY_TIMEOUT_MS").unwrap_or(defaults.timeout),
                max_retries: env_parsed("LOOKOUT_QUERY_RETRIES").unwrap_or(defaults.max_retries),
                min_backoff: env_millis("LOOKOUT_QUERY_BACKOFF_MIN_MS")
                    .unwrap_or(defaults.min_backoff),
                max_backoff: env_millis("LOOKOUT_QUERY_BACKOFF_MAX_MS")
                    .unwrap_or(defaults.max_backoff),
            },
        }
    }

    /// Base URL of the query engine's call endpoint.
    pub fn query_url_base(&self) -> String {
        format!("http://{}:{}/query/call", self.query_host, self.query_port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query_host: "127.0.0.1".to_string(),
            query_port: 2222,
            retry: RetryPolicy::default(),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parsed::<u64>(name).map(Duration::from_millis)
}
