use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::canary::{CanaryEvaluator, CanarySpec};
use crate::mesh::{self, MeshClient};
use crate::query::QueryError;

/// Application state shared across handlers
pub struct AppState {
    pub evaluator: CanaryEvaluator,
    /// Mesh client, when one is configured. Absent means every mesh
    /// aggregation degrades to an empty result.
    pub mesh: Option<Arc<dyn MeshClient + Send + Sync>>,
}

impl AppState {
    fn mesh_client(&self) -> Option<&dyn MeshClient> {
        self.mesh.as_deref().map(|c| c as &dyn MeshClient)
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Canary evaluation
// ============================================================================

#[derive(Serialize)]
pub struct EvaluateResponse {
    /// True when every row passed the filter
    pub passed: bool,
    /// Diagnostic text for a failed or invalid result
    pub diagnostic: Option<String>,
}

pub async fn evaluate_canary(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<CanarySpec>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let diagnostic = state.evaluator.evaluate(&spec).await?;
    Ok(Json(EvaluateResponse {
        passed: diagnostic.is_none(),
        diagnostic,
    }))
}

#[derive(Deserialize)]
pub struct CountRequest {
    pub job_id: String,
    pub path: String,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: i64,
}

pub async fn count_hits(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CountRequest>,
) -> Result<Json<CountResponse>, ApiError> {
    let count = state
        .evaluator
        .hit_count(&request.job_id, &request.path)
        .await?;
    Ok(Json(CountResponse { count }))
}

// ============================================================================
// Mesh aggregation
// ============================================================================

#[derive(Deserialize)]
pub struct MeshRequest {
    pub job_id: String,
    pub path: String,
}

#[derive(Serialize)]
pub struct MeshBytesResponse {
    pub bytes_per_host: HashMap<String, i64>,
}

pub async fn mesh_bytes(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MeshRequest>,
) -> Json<MeshBytesResponse> {
    let bytes_per_host =
        mesh::total_bytes_per_host(state.mesh_client(), &request.job_id, &request.path);
    Json(MeshBytesResponse { bytes_per_host })
}

#[derive(Serialize)]
pub struct MeshFilesResponse {
    pub files_per_task: HashMap<String, u64>,
}

pub async fn mesh_files(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MeshRequest>,
) -> Json<MeshFilesResponse> {
    let files_per_task =
        mesh::file_count_per_task(state.mesh_client(), &request.job_id, &request.path);
    Json(MeshFilesResponse { files_per_task })
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(String),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Url(msg) => ApiError::BadRequest(msg),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
