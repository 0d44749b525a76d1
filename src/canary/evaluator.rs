//! Canary evaluation
//!
//! Composes the query client, shape validation, and row filtering into a
//! single check: fetch the job's recent output, validate the table, run
//! the configured predicate per row. The outcome is either no diagnostic
//! (pass) or a diagnostic string (fail/invalid); only retry exhaustion
//! escapes as a hard error.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::filter::{compile_filter, evaluate_rows};
use crate::query::{build_query_url, validate, QueryClient, QueryError, RawResult, RetryPolicy};
use crate::report::{render, Finding, FindingKind};

/// Ops used for counting queries.
const DEFAULT_OPS: &str = "gather=s";

/// Appended to caller ops so a runaway query cannot overwhelm the caller.
const OPS_SAFETY_CAP: &str = ";limit=1000;merge=kkkkkkkkkkkk";

/// One canary check: which job to query, where, and what must hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanarySpec {
    /// Job whose output is checked
    pub job_id: String,
    /// Query path within the job's tree, may carry date macros
    pub path: String,
    /// Query ops, a safety cap is appended
    #[serde(default)]
    pub ops: String,
    /// Remote ops, passed through
    #[serde(default)]
    pub rops: String,
    /// Filter expression; every data row must satisfy it
    pub filter: String,
}

/// Evaluates canary checks against the query engine.
#[derive(Debug, Clone)]
pub struct CanaryEvaluator {
    base_url: String,
    client: QueryClient,
}

impl CanaryEvaluator {
    pub fn new(settings: &Settings) -> Self {
        Self::with_base_url(settings.query_url_base(), settings.retry.clone())
    }

    pub fn with_base_url(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            client: QueryClient::new(policy),
        }
    }

    /// Run one canary check.
    ///
    /// `Ok(None)` means every row passed; `Ok(Some(text))` carries the
    /// diagnostic for a failed or shape-invalid result. Retry exhaustion
    /// propagates as [`QueryError`].
    pub async fn evaluate(&self, spec: &CanarySpec) -> Result<Option<String>, QueryError> {
        let ops = format!("{}{}", spec.ops, OPS_SAFETY_CAP);
        let url = build_query_url(&self.base_url, &spec.job_id, &spec.path, &ops, &spec.rops)?;
        tracing::trace!(url = %url, "Emitting canary query");
        let raw = self.client.fetch_rows(url).await?;
        Ok(assess(&raw, &spec.filter))
    }

    /// Count the hits along a path in a job's tree.
    pub async fn hit_count(&self, job_id: &str, check_path: &str) -> Result<i64, QueryError> {
        let url = build_query_url(&self.base_url, job_id, check_path, DEFAULT_OPS, DEFAULT_OPS)?;
        let count = self.client.fetch_count(url).await?;
        if count == 0 {
            tracing::warn!(job_id = %job_id, check_path = %check_path, "Found no data; returning zero");
        }
        Ok(count)
    }
}

/// Assess a fetched result against a filter expression.
///
/// Pure with respect to the network: the same result and expression always
/// produce the same outcome. `None` means all rows passed.
pub fn assess(raw: &RawResult, filter_expr: &str) -> Option<String> {
    let mut validation = validate(raw);
    match compile_filter(filter_expr) {
        Ok(filter) => match &validation.table {
            Some(table) => {
                let findings = evaluate_rows(table, &filter);
                if findings.is_empty() {
                    None
                } else {
                    Some(render(&findings))
                }
            }
            None => Some(render(&validation.findings)),
        },
        Err(e) => {
            tracing::error!(error = %e, "Error attempting to create row filter");
            validation
                .findings
                .push(Finding::new(FindingKind::BadFilter, e.to_string()));
            Some(render(&validation.findings))
        }
    }
}
