//! Persisted row representation
//!
//! A [`Record`] is the wire form crossing the store seam: one map of column
//! values per row, plus, for eager selects, related rows nested under their
//! relationship name. Join fan-out produces one record per SQL row, each
//! carrying a single related row per relationship, until the query planner
//! folds duplicates back together.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::DataError;

use super::value::Value;

/// One row: column values plus eager-loaded related rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
    related: BTreeMap<String, Vec<Record>>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment, used by entity `to_record` impls
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column value
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.fields.insert(column.to_string(), value.into());
    }

    /// Column value, if present
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Iterate columns and values
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns set
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no column is set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Attach one related row under a relationship name
    pub fn attach_related(&mut self, name: &str, row: Record) {
        self.related.entry(name.to_string()).or_default().push(row);
    }

    /// Related rows for a relationship name (empty when none were loaded)
    pub fn related(&self, name: &str) -> &[Record] {
        self.related.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fold another record's related rows into this one
    ///
    /// Used by the planner when join fan-out yields the same owner row more
    /// than once: the duplicate's related rows migrate to the first
    /// occurrence.
    pub fn merge_related_from(&mut self, other: Record) {
        for (name, rows) in other.related {
            self.related.entry(name).or_default().extend(rows);
        }
    }

    fn require(&self, column: &str) -> Result<&Value, DataError> {
        self.get(column).ok_or_else(|| DataError::Mapping {
            column: column.to_string(),
            detail: "column missing from record".to_string(),
        })
    }

    fn mismatch(column: &str, expected: &str, found: &Value) -> DataError {
        DataError::Mapping {
            column: column.to_string(),
            detail: format!("expected {}, found {:?}", expected, found),
        }
    }

    /// Required integer column
    pub fn int(&self, column: &str) -> Result<i64, DataError> {
        let value = self.require(column)?;
        value
            .as_int()
            .ok_or_else(|| Self::mismatch(column, "integer", value))
    }

    /// Optional integer column (`Null` or absent reads as `None`)
    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, DataError> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_int()
                .map(Some)
                .ok_or_else(|| Self::mismatch(column, "integer", value)),
        }
    }

    /// Required float column
    pub fn float(&self, column: &str) -> Result<f64, DataError> {
        let value = self.require(column)?;
        value
            .as_float()
            .ok_or_else(|| Self::mismatch(column, "float", value))
    }

    /// Required text column
    pub fn text(&self, column: &str) -> Result<String, DataError> {
        let value = self.require(column)?;
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| Self::mismatch(column, "text", value))
    }

    /// Optional text column
    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DataError> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_text()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| Self::mismatch(column, "text", value)),
        }
    }

    /// Required boolean column
    pub fn bool(&self, column: &str) -> Result<bool, DataError> {
        let value = self.require(column)?;
        value
            .as_bool()
            .ok_or_else(|| Self::mismatch(column, "boolean", value))
    }

    /// Required timestamp column
    pub fn timestamp(&self, column: &str) -> Result<DateTime<Utc>, DataError> {
        let value = self.require(column)?;
        value
            .as_timestamp()
            .ok_or_else(|| Self::mismatch(column, "timestamp", value))
    }
}
