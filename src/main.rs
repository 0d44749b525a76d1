//! Lookout Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - LOOKOUT_HOST: Bind address (default: 0.0.0.0)
//! - LOOKOUT_PORT: Port number (default: 8080)
//! - LOOKOUT_QUERY_HOST: Query engine host (default: 127.0.0.1)
//! - LOOKOUT_QUERY_PORT: Query engine port (default: 2222)
//! - LOOKOUT_QUERY_TIMEOUT_MS: Per-attempt timeout (default: 20000)
//! - LOOKOUT_QUERY_RETRIES: Re-attempts after the first failure (default: 4)
//! - LOOKOUT_QUERY_BACKOFF_MIN_MS: Smallest retry delay (default: 10000)
//! - LOOKOUT_QUERY_BACKOFF_MAX_MS: Largest retry delay (default: 120000)
//! - RUST_LOG: Log level (default: info)
//!
//! An external scheduler drives the canary checks through the HTTP API.

use lookout::api::{run_server, ServerConfig};
use lookout::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookout=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse basic configuration from environment
    let host = std::env::var("LOOKOUT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("LOOKOUT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let settings = Settings::from_env();

    tracing::info!("Lookout configuration:");
    tracing::info!("  Host: {}:{}", host, port);
    tracing::info!("  Query engine: {}", settings.query_url_base());
    tracing::info!(
        "  Query timeout: {} ms, retries: {}",
        settings.retry.timeout.as_millis(),
        settings.retry.max_retries
    );
    tracing::info!(
        "  Backoff bounds: {} ms .. {} ms",
        settings.retry.min_backoff.as_millis(),
        settings.retry.max_backoff.as_millis()
    );

    let config = ServerConfig {
        host,
        port,
        settings,
    };

    // The mesh client library is wired in by embedders; the standalone
    // server runs with mesh aggregation degraded to empty results.
    run_server(config, None).await
}
