//! Row predicates compiled from a configuration string
//!
//! A canary's filter arrives as a JSON condition tree: leaf comparisons on
//! named fields plus `all`/`any`/`not` combinators. Decoding and regex
//! compilation happen once, up front; bad expressions fail there and never
//! reach per-row evaluation.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::record::Record;

/// Per-row evaluation failures.
///
/// These are expected, recoverable conditions: a failure on one row must
/// not stop evaluation of the rest.
#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    #[error("Field not present in row: {0}")]
    MissingField(String),

    #[error("Field {field} is not numeric: {value}")]
    NotNumeric { field: String, value: String },
}

/// A boolean predicate over one record.
pub trait RowPredicate {
    fn test(&self, record: &Record) -> Result<bool, PredicateError>;
}

/// Declarative filter configuration, as decoded from the caller's string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterSpec {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    GreaterThan { field: String, threshold: f64 },
    LessThan { field: String, threshold: f64 },
    Matches { field: String, pattern: String },
    NonEmpty { field: String },
    All { of: Vec<FilterSpec> },
    Any { of: Vec<FilterSpec> },
    Not { spec: Box<FilterSpec> },
}

/// Filter construction errors
#[derive(Debug, thiserror::Error)]
pub enum FilterCompileError {
    #[error("Filter decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Filter pattern is invalid: {0}")]
    Pattern(#[from] regex::Error),
}

/// Decode and compile a filter expression.
pub fn compile_filter(expr: &str) -> Result<CompiledFilter, FilterCompileError> {
    let spec: FilterSpec = serde_json::from_str(expr)?;
    spec.compile()
}

impl FilterSpec {
    /// Compile the tree, turning `matches` patterns into regexes.
    pub fn compile(self) -> Result<CompiledFilter, FilterCompileError> {
        Ok(match self {
            FilterSpec::Equals { field, value } => CompiledFilter::Equals { field, value },
            FilterSpec::NotEquals { field, value } => CompiledFilter::NotEquals { field, value },
            FilterSpec::GreaterThan { field, threshold } => {
                CompiledFilter::GreaterThan { field, threshold }
            }
            FilterSpec::LessThan { field, threshold } => {
                CompiledFilter::LessThan { field, threshold }
            }
            FilterSpec::Matches { field, pattern } => CompiledFilter::Matches {
                field,
                pattern: Regex::new(&pattern)?,
            },
            FilterSpec::NonEmpty { field } => CompiledFilter::NonEmpty { field },
            FilterSpec::All { of } => CompiledFilter::All(
                of.into_iter()
                    .map(FilterSpec::compile)
                    .collect::<Result<_, _>>()?,
            ),
            FilterSpec::Any { of } => CompiledFilter::Any(
                of.into_iter()
                    .map(FilterSpec::compile)
                    .collect::<Result<_, _>>()?,
            ),
            FilterSpec::Not { spec } => CompiledFilter::Not(Box::new(spec.compile()?)),
        })
    }
}

/// A compiled, ready-to-run filter.
#[derive(Debug, Clone)]
pub enum CompiledFilter {
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    GreaterThan { field: String, threshold: f64 },
    LessThan { field: String, threshold: f64 },
    Matches { field: String, pattern: Regex },
    NonEmpty { field: String },
    All(Vec<CompiledFilter>),
    Any(Vec<CompiledFilter>),
    Not(Box<CompiledFilter>),
}

impl RowPredicate for CompiledFilter {
    fn test(&self, record: &Record) -> Result<bool, PredicateError> {
        match self {
            CompiledFilter::Equals { field, value } => Ok(lookup(record, field)? == value),
            CompiledFilter::NotEquals { field, value } => Ok(lookup(record, field)? != value),
            CompiledFilter::GreaterThan { field, threshold } => {
                Ok(numeric(record, field)? > *threshold)
            }
            CompiledFilter::LessThan { field, threshold } => {
                Ok(numeric(record, field)? < *threshold)
            }
            CompiledFilter::Matches { field, pattern } => {
                Ok(pattern.is_match(lookup(record, field)?))
            }
            CompiledFilter::NonEmpty { field } => {
                Ok(record.get(field).is_some_and(|v| !v.is_empty()))
            }
            CompiledFilter::All(of) => {
                for predicate in of {
                    if !predicate.test(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            CompiledFilter::Any(of) => {
                for predicate in of {
                    if predicate.test(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            CompiledFilter::Not(inner) => Ok(!inner.test(record)?),
        }
    }
}

fn lookup<'a>(record: &'a Record, field: &str) -> Result<&'a str, PredicateError> {
    record
        .get(field)
        .ok_or_else(|| PredicateError::MissingField(field.to_string()))
}

fn numeric(record: &Record, field: &str) -> Result<f64, PredicateError> {
    let value = lookup(record, field)?;
    value.parse().map_err(|_| PredicateError::NotNumeric {
        field: field.to_string(),
        value: value.to_string(),
    })
}
