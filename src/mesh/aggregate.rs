//! Best-effort aggregation of mesh file metadata
//!
//! Mesh lookups are advisory signals for alerting. A missing or failing
//! mesh client degrades to an empty result with a warning rather than
//! failing the evaluation; there is no retry at this layer.

use std::collections::HashMap;

use super::client::MeshClient;
use crate::expand::expand_date_macros;

/// Path segment separating a task's prefix from its replicated output.
const TASK_SEGMENT_MARKER: &str = "/gold/";

/// Convert a job id and directory path into a mesh glob pattern.
///
/// Date macros in `dir_path` are expanded, e.g.
/// `split/{{now-1}}/importantfiles/*.gz`.
pub fn lookup_pattern(job_id: &str, dir_path: &str) -> String {
    format!("/job*/{}/*/gold/{}", job_id, expand_date_macros(dir_path))
}

/// Total byte size of matching files, grouped by host.
///
/// Returns an empty map when the mesh client is not configured or the
/// listing fails.
pub fn total_bytes_per_host(
    client: Option<&dyn MeshClient>,
    job_id: &str,
    dir_path: &str,
) -> HashMap<String, i64> {
    let pattern = lookup_pattern(job_id, dir_path);
    let Some(client) = client else {
        tracing::warn!(
            job_id = %job_id,
            dir_path = %dir_path,
            "Mesh lookup requested while mesh client is not configured; returning zero"
        );
        return HashMap::new();
    };

    let mut bytes_per_host = HashMap::new();
    match client.list_files(&[pattern]) {
        Ok(refs) => {
            for file_ref in refs {
                *bytes_per_host.entry(file_ref.host_id).or_insert(0) += file_ref.size_bytes;
            }
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Mesh lookup failed");
        }
    }
    bytes_per_host
}

/// Number of matching files per task, keyed `host_id + ":" + task_prefix`
/// where the prefix is the path up to the first `/gold/` segment.
///
/// Same degrade-not-fail policy as [`total_bytes_per_host`].
pub fn file_count_per_task(
    client: Option<&dyn MeshClient>,
    job_id: &str,
    dir_path: &str,
) -> HashMap<String, u64> {
    let pattern = lookup_pattern(job_id, dir_path);
    let Some(client) = client else {
        tracing::warn!(
            job_id = %job_id,
            dir_path = %dir_path,
            "Mesh lookup requested while mesh client is not configured; returning zero"
        );
        return HashMap::new();
    };

    let mut counts = HashMap::new();
    match client.list_files(&[pattern]) {
        Ok(refs) => {
            for file_ref in refs {
                let Some(offset) = file_ref.path.find(TASK_SEGMENT_MARKER) else {
                    tracing::warn!(
                        path = %file_ref.path,
                        "Mesh file reference has no task segment marker; skipping"
                    );
                    continue;
                };
                let key = format!("{}:{}", file_ref.host_id, &file_ref.path[..offset]);
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Mesh lookup failed");
        }
    }
    counts
}
