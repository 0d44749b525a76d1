//! Structured diagnostics for canary evaluation
//!
//! Checks accumulate `Finding`s instead of concatenating strings; the
//! findings are rendered to text once, at the boundary that reports them.

use std::fmt;

/// What a finding is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingKind {
    /// The result had no rows at all
    MissingHeader,
    /// The result had a header row but no data rows
    HeaderOnly,
    /// Informational dump of the raw result
    RawDump,
    /// A data row was not a list of cells
    MalformedRow,
    /// A data row's length differs from the header's
    RowLength,
    /// The filter rejected a data row
    FilterRejected,
    /// The filter itself failed on a data row
    FilterError,
    /// The filter expression could not be compiled
    BadFilter,
}

/// One diagnostic element, tied to a data row where that makes sense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Data row index (header excluded, first data row is 0)
    pub row: Option<usize>,
    pub detail: String,
}

impl Finding {
    pub fn new(kind: FindingKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            row: None,
            detail: detail.into(),
        }
    }

    pub fn for_row(kind: FindingKind, row: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            row: Some(row),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FindingKind::MissingHeader => write!(f, "Header row is missing."),
            FindingKind::HeaderOnly => write!(f, "No data is present (only header row)."),
            FindingKind::RawDump => write!(f, "{}", self.detail),
            FindingKind::MalformedRow | FindingKind::RowLength => {
                write!(f, "{}", self.detail)
            }
            FindingKind::FilterRejected => write!(
                f,
                "filter failed for row: {} bundle: {}",
                self.row.unwrap_or(0),
                self.detail
            ),
            FindingKind::FilterError => write!(f, "{}", self.detail),
            FindingKind::BadFilter => {
                write!(f, "Error attempting to create row filter: {}", self.detail)
            }
        }
    }
}

/// Render findings to the boundary text, one line per finding.
///
/// An empty slice renders to an empty string, which callers treat as "pass".
pub fn render(findings: &[Finding]) -> String {
    let mut out = String::new();
    for finding in findings {
        out.push_str(&finding.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_one_per_line() {
        let findings = vec![
            Finding::new(FindingKind::HeaderOnly, ""),
            Finding::for_row(FindingKind::FilterRejected, 2, "{h1=a}"),
        ];
        let text = render(&findings);
        assert_eq!(
            text,
            "No data is present (only header row).\nfilter failed for row: 2 bundle: {h1=a}\n"
        );
    }

    #[test]
    fn test_bad_filter_message() {
        let finding = Finding::new(FindingKind::BadFilter, "expected value at line 1");
        assert_eq!(
            finding.to_string(),
            "Error attempting to create row filter: expected value at line 1"
        );
    }
}
