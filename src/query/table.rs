//! Tabular query results
//!
//! The query engine answers with a JSON 2-D array of string cells, but
//! nothing about the wire guarantees that shape: rows may be missing,
//! ragged, or not arrays at all. [`RawResult`] holds the response as
//! received; [`Table`] only exists once validation has checked it.

use std::fmt;

/// A query response decoded as a JSON array, shape unchecked.
#[derive(Debug, Clone)]
pub struct RawResult {
    rows: Vec<serde_json::Value>,
}

impl RawResult {
    pub fn new(rows: Vec<serde_json::Value>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[serde_json::Value] {
        &self.rows
    }

    /// The row as string cells, or `None` when it is not an array.
    pub fn cells(&self, index: usize) -> Option<Vec<String>> {
        match self.rows.get(index) {
            Some(serde_json::Value::Array(items)) => {
                Some(items.iter().map(cell_to_string).collect())
            }
            _ => None,
        }
    }

    /// JSON text of the whole result, used in diagnostics.
    pub fn dump(&self) -> String {
        serde_json::Value::Array(self.rows.clone()).to_string()
    }
}

impl fmt::Display for RawResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dump())
    }
}

/// A shape-validated result: every row has the header's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Field names from row 0
    pub header: Vec<String>,
    /// Data rows, header excluded
    pub rows: Vec<Vec<String>>,
}

/// String form of one cell: strings verbatim, null empty, other scalars
/// by their JSON text.
pub(crate) fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cells_stringify() {
        let raw = RawResult::new(vec![json!(["a", 42, true, null])]);
        assert_eq!(
            raw.cells(0).unwrap(),
            vec!["a".to_string(), "42".to_string(), "true".to_string(), String::new()]
        );
    }

    #[test]
    fn test_cells_for_non_array_row() {
        let raw = RawResult::new(vec![json!("not a row")]);
        assert!(raw.cells(0).is_none());
        assert!(raw.cells(1).is_none());
    }

    #[test]
    fn test_dump_is_json() {
        let raw = RawResult::new(vec![json!(["h1"]), json!(["a"])]);
        assert_eq!(raw.dump(), r#"[["h1"],["a"]]"#);
    }
}
