pub mod client;
pub mod table;
pub mod validate;

pub use client::{QueryClient, QueryError, RetryPolicy};
pub use table::{RawResult, Table};
pub use validate::{validate, Validation};

use reqwest::Url;

use crate::expand::expand_date_macros;

/// Build a query-engine URL: `base?job=..&path=..&ops=..&rops=..`.
///
/// Date macros in `path` are expanded first; parameter values are
/// percent-encoded by the URL builder.
pub fn build_query_url(
    base: &str,
    job_id: &str,
    path: &str,
    ops: &str,
    rops: &str,
) -> Result<Url, QueryError> {
    Url::parse_with_params(
        base,
        &[
            ("job", job_id),
            ("path", expand_date_macros(path).as_str()),
            ("ops", ops),
            ("rops", rops),
        ],
    )
    .map_err(|e| QueryError::Url(e.to_string()))
}
