//! Shape validation of raw query results
//!
//! A result is usable for filtering only when it has a header row, at
//! least one data row, and every data row matches the header's length.
//! Validation reports findings either way; callers fold them into the
//! evaluation's diagnostic text.

use super::table::{RawResult, Table};
use crate::report::{Finding, FindingKind};

/// Outcome of validating one raw result.
pub struct Validation {
    /// Present iff the result is shape-valid
    pub table: Option<Table>,
    /// Diagnostics, returned regardless of validity
    pub findings: Vec<Finding>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.table.is_some()
    }
}

/// Check structural well-formedness of a raw result.
pub fn validate(raw: &RawResult) -> Validation {
    let mut findings = Vec::new();

    if raw.is_empty() {
        findings.push(Finding::new(FindingKind::MissingHeader, ""));
        return Validation {
            table: None,
            findings,
        };
    }
    if raw.len() == 1 {
        findings.push(Finding::new(FindingKind::HeaderOnly, ""));
        return Validation {
            table: None,
            findings,
        };
    }

    // Informational, not an invalidity signal by itself.
    findings.push(Finding::new(FindingKind::RawDump, raw.dump()));

    let Some(header) = raw.cells(0) else {
        findings.push(Finding::new(
            FindingKind::MalformedRow,
            "header row is not a list of cells",
        ));
        return Validation {
            table: None,
            findings,
        };
    };

    let mut valid = true;
    let mut rows = Vec::with_capacity(raw.len() - 1);
    for i in 1..raw.len() {
        let data_row = i - 1;
        match raw.cells(i) {
            None => {
                valid = false;
                findings.push(Finding::for_row(
                    FindingKind::MalformedRow,
                    data_row,
                    format!("data row {} is not a list of cells", data_row),
                ));
            }
            Some(cells) if cells.len() != header.len() => {
                valid = false;
                findings.push(Finding::for_row(
                    FindingKind::RowLength,
                    data_row,
                    format!(
                        "data row {} has {} cells, header has {}",
                        data_row,
                        cells.len(),
                        header.len()
                    ),
                ));
            }
            Some(cells) => rows.push(cells),
        }
    }

    Validation {
        table: valid.then_some(Table { header, rows }),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::render;
    use serde_json::json;

    #[test]
    fn test_empty_result() {
        let validation = validate(&RawResult::new(vec![]));
        assert!(!validation.is_valid());
        assert!(render(&validation.findings).contains("Header row is missing."));
    }

    #[test]
    fn test_header_only() {
        let validation = validate(&RawResult::new(vec![json!(["h1", "h2"])]));
        assert!(!validation.is_valid());
        assert!(render(&validation.findings).contains("only header row"));
    }

    #[test]
    fn test_valid_table() {
        let validation = validate(&RawResult::new(vec![
            json!(["h1", "h2"]),
            json!(["a", "b"]),
            json!(["c", "d"]),
        ]));
        assert!(validation.is_valid());
        let table = validation.table.unwrap();
        assert_eq!(table.header, vec!["h1", "h2"]);
        assert_eq!(table.rows.len(), 2);
        // the dump is informational and always present for non-trivial results
        assert!(validation
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::RawDump));
    }

    #[test]
    fn test_ragged_row() {
        let validation = validate(&RawResult::new(vec![
            json!(["h1", "h2"]),
            json!(["a", "b"]),
            json!(["c"]),
        ]));
        assert!(!validation.is_valid());
        let finding = validation
            .findings
            .iter()
            .find(|f| f.kind == FindingKind::RowLength)
            .unwrap();
        assert_eq!(finding.row, Some(1));
    }

    #[test]
    fn test_non_array_row() {
        let validation = validate(&RawResult::new(vec![
            json!(["h1"]),
            json!("scalar"),
        ]));
        assert!(!validation.is_valid());
        assert!(validation
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::MalformedRow && f.row == Some(0)));
    }

    #[test]
    fn test_malformed_header() {
        let validation = validate(&RawResult::new(vec![json!(42), json!(["a"])]));
        assert!(!validation.is_valid());
        assert!(validation
            .findings
            .iter()
            .any(|f| f.kind == FindingKind::MalformedRow));
    }
}
