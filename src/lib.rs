//! Lookout: Canary Health Checks for Distributed Jobs
//!
//! Evaluates health/canary conditions for jobs in a distributed
//! data-processing cluster: file metadata aggregated from a file-mesh
//! service, and tabular query results fetched resiliently from a
//! distributed query engine, validated, and filtered row by row against
//! a configured predicate.
//!
//! # Features
//!
//! - **Resilient Queries**: per-attempt timeout, bounded retries,
//!   clamped exponential backoff
//! - **Shape Validation**: header/data-row structure checked before any
//!   filtering, with informative diagnostics
//! - **Row Filtering**: JSON-configured predicates over named fields,
//!   per-row failures isolated
//! - **Mesh Aggregation**: best-effort byte and file counts per host and
//!   task, degrading to empty results when the mesh is unavailable
//! - **HTTP API**: a small axum service so an external scheduler can
//!   drive checks remotely
//!
//! # Example
//!
//! ```no_run
//! use lookout::{CanaryEvaluator, CanarySpec, Settings};
//!
//! # async fn demo() -> Result<(), lookout::QueryError> {
//! let settings = Settings::from_env();
//! let evaluator = CanaryEvaluator::new(&settings);
//!
//! let spec = CanarySpec {
//!     job_id: "job1".to_string(),
//!     path: "root/{{now-1}}/canary".to_string(),
//!     ops: String::new(),
//!     rops: String::new(),
//!     filter: r#"{"op":"greater_than","field":"count","threshold":0}"#.to_string(),
//! };
//!
//! match evaluator.evaluate(&spec).await? {
//!     None => println!("canary passed"),
//!     Some(diagnostic) => println!("canary failed:\n{}", diagnostic),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod canary;
pub mod config;
pub mod expand;
pub mod filter;
pub mod mesh;
pub mod query;
pub mod report;

// Re-export commonly used types
pub use canary::{CanaryEvaluator, CanarySpec};
pub use config::Settings;
pub use mesh::{FileReference, MeshClient, MeshError};
pub use query::{QueryClient, QueryError, RetryPolicy};
