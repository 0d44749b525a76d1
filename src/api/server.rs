use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    count_hits, evaluate_canary, health_check, mesh_bytes, mesh_files, AppState,
};
use crate::canary::CanaryEvaluator;
use crate::config::Settings;
use crate::mesh::MeshClient;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub settings: Settings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            settings: Settings::default(),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Canary checks
        .route("/canary/evaluate", post(evaluate_canary))
        .route("/canary/count", post(count_hits))
        // Mesh aggregation
        .route("/mesh/bytes", post(mesh_bytes))
        .route("/mesh/files", post(mesh_files))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
    mesh: Option<Arc<dyn MeshClient + Send + Sync>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if mesh.is_some() {
        tracing::info!("Mesh aggregation enabled");
    } else {
        tracing::info!("No mesh client configured; mesh aggregation degrades to empty results");
    }

    let state = Arc::new(AppState {
        evaluator: CanaryEvaluator::new(&config.settings),
        mesh,
    });

    // Build router
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting Lookout server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Lookout server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RetryPolicy;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        // Point at a closed port so query-backed routes fail fast.
        let policy = RetryPolicy {
            timeout: Duration::from_millis(200),
            max_retries: 1,
            min_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        };
        let state = Arc::new(AppState {
            evaluator: CanaryEvaluator::with_base_url("http://127.0.0.1:9/query/call", policy),
            mesh: None,
        });
        build_router(state)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mesh_bytes_without_client() {
        let app = create_test_app();

        let body = serde_json::json!({ "job_id": "job1", "path": "split/x" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mesh/bytes")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, serde_json::json!({ "bytes_per_host": {} }));
    }

    #[tokio::test]
    async fn test_evaluate_unreachable_engine_is_bad_gateway() {
        let app = create_test_app();

        let body = serde_json::json!({
            "job_id": "job1",
            "path": "root/canary",
            "filter": r#"{"op":"non_empty","field":"h1"}"#
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/canary/evaluate")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
