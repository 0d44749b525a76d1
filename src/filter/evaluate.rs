//! Per-row predicate evaluation
//!
//! Runs an already-compiled predicate over every data row of a validated
//! table. Rejections and per-row failures are collected as findings; a
//! failure on one row never stops evaluation of the rest.

use super::predicate::RowPredicate;
use super::record::Record;
use crate::query::Table;
use crate::report::{Finding, FindingKind};

/// Apply the predicate to each data row, collecting diagnostics.
///
/// An empty vec means every row passed. Rows are numbered from 0, header
/// excluded.
pub fn evaluate_rows(table: &Table, predicate: &dyn RowPredicate) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (i, row) in table.rows.iter().enumerate() {
        let record = Record::from_row(&table.header, row);
        match predicate.test(&record) {
            Ok(true) => {
                tracing::trace!(row = i, "Row filter result is SUCCESS");
            }
            Ok(false) => {
                tracing::trace!(row = i, "Row filter result is FAILURE");
                findings.push(Finding::for_row(
                    FindingKind::FilterRejected,
                    i,
                    record.to_string(),
                ));
            }
            Err(e) => {
                tracing::warn!(row = i, error = %e, "Error while evaluating row");
                findings.push(Finding::for_row(FindingKind::FilterError, i, e.to_string()));
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::predicate::compile_filter;
    use crate::report::render;

    fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_all_rows_pass() {
        let filter =
            compile_filter(r#"{"op":"not_equals","field":"h1","value":"bad"}"#).unwrap();
        let table = table(&["h1", "h2"], &[&["a", "1"], &["b", "2"]]);
        assert!(evaluate_rows(&table, &filter).is_empty());
    }

    #[test]
    fn test_rejected_row_is_reported() {
        let filter =
            compile_filter(r#"{"op":"not_equals","field":"h1","value":"bad"}"#).unwrap();
        let table = table(&["h1", "h2"], &[&["a", "1"], &["bad", "2"]]);
        let findings = evaluate_rows(&table, &filter);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(1));
        let text = render(&findings);
        assert_eq!(text, "filter failed for row: 1 bundle: {h1=bad, h2=2}\n");
    }

    #[test]
    fn test_row_error_does_not_stop_evaluation() {
        let filter =
            compile_filter(r#"{"op":"greater_than","field":"h2","threshold":1}"#).unwrap();
        // row 0 errors (not numeric), row 1 passes, row 2 fails the filter
        let table = table(&["h1", "h2"], &[&["a", "x"], &["b", "5"], &["c", "0"]]);
        let findings = evaluate_rows(&table, &filter);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, FindingKind::FilterError);
        assert_eq!(findings[0].row, Some(0));
        assert_eq!(findings[1].kind, FindingKind::FilterRejected);
        assert_eq!(findings[1].row, Some(2));
    }

    #[test]
    fn test_idempotent_diagnostics() {
        let filter =
            compile_filter(r#"{"op":"equals","field":"h1","value":"keep"}"#).unwrap();
        let table = table(&["h2", "h1"], &[&["1", "drop"], &["2", "keep"]]);
        let first = render(&evaluate_rows(&table, &filter));
        let second = render(&evaluate_rows(&table, &filter));
        assert_eq!(first, second);
    }
}
