pub mod aggregate;
pub mod client;

pub use aggregate::{file_count_per_task, lookup_pattern, total_bytes_per_host};
pub use client::{FileReference, MeshClient, MeshError};
