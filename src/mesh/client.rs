//! Narrow interface to the file-mesh service
//!
//! The mesh transport and its client library live outside this crate; the
//! aggregation layer only needs glob-pattern listing.

use serde::{Deserialize, Serialize};

/// Metadata for one file replicated on one cluster host.
///
/// Produced by a single listing call and scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReference {
    /// UUID of the host holding the file
    pub host_id: String,
    /// Path of the file on that host
    pub path: String,
    /// Size in bytes
    pub size_bytes: i64,
}

impl FileReference {
    pub fn new(host_id: impl Into<String>, path: impl Into<String>, size_bytes: i64) -> Self {
        Self {
            host_id: host_id.into(),
            path: path.into(),
            size_bytes,
        }
    }
}

/// Client for listing files across the mesh
pub trait MeshClient {
    /// List every file matching any of the glob patterns.
    fn list_files(&self, patterns: &[String]) -> Result<Vec<FileReference>, MeshError>;
}

/// Mesh listing errors
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mesh transport error: {0}")]
    Transport(String),
}
