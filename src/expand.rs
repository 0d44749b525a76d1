//! Date-macro expansion for job paths
//!
//! Paths handed to the mesh and query layers may carry `{{now}}` style
//! macros, e.g. `split/{{now-1}}/importantfiles/*.gz`. Each token expands
//! to a UTC date formatted `yyMMdd`, offset by the given number of days.
//! Text that is not a recognized token passes through untouched.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use regex::{Captures, Regex};

static MACRO_RE: OnceLock<Regex> = OnceLock::new();

fn macro_re() -> &'static Regex {
    MACRO_RE.get_or_init(|| Regex::new(r"\{\{now([+-]\d+)?\}\}").expect("date macro pattern"))
}

/// Expand all `{{now}}` / `{{now-N}}` / `{{now+N}}` tokens against the
/// current UTC date.
pub fn expand_date_macros(path: &str) -> String {
    expand_date_macros_at(path, Utc::now())
}

/// Expand against an explicit clock. The entry point for tests.
pub fn expand_date_macros_at(path: &str, now: DateTime<Utc>) -> String {
    macro_re()
        .replace_all(path, |caps: &Captures<'_>| {
            let offset: i64 = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            let day = now.date_naive() + Duration::days(offset);
            day.format("%y%m%d").to_string()
        })
        .into_owned()
}
