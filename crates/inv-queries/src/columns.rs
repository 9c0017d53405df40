//! Column allow-list
//!
//! Maps API field names to backend columns. Only names registered here ever
//! reach generated SQL; anything else resolves to the map's default column.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

/// Category of a field, deciding how its values are bound and encoded in cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Timestamp,
    Integer,
    Uuid,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Integer => "integer",
            Self::Uuid => "uuid",
        }
    }

    /// Read a textual value as this kind; other values pass through
    pub fn coerce(&self, value: Value) -> Result<Value, String> {
        match (self, value) {
            (Self::Timestamp, Value::Text(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| Value::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|_| format!("invalid timestamp '{}'", s)),
            (Self::Uuid, Value::Text(s)) => s
                .parse::<uuid::Uuid>()
                .map(Value::Uuid)
                .map_err(|_| format!("invalid uuid '{}'", s)),
            (Self::Integer, Value::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("invalid integer '{}'", s)),
            (_, value) => Ok(value),
        }
    }
}

/// A backend column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: FieldKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Record of an unknown field redirected to the default column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFallback {
    pub field: String,
    pub fallback: String,
}

impl fmt::Display for ColumnFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field '{}' mapped to '{}'", self.field, self.fallback)
    }
}

/// Fixed mapping of API field names to columns
#[derive(Debug, Clone)]
pub struct ColumnMap {
    columns: HashMap<String, Column>,
    id: Column,
    default: Column,
}

impl ColumnMap {
    /// `id` is the unique row identifier used as keyset tie-breaker,
    /// `default` the column unknown fields resolve to.
    pub fn new(id: Column, default: Column) -> Self {
        Self {
            columns: HashMap::new(),
            id,
            default,
        }
    }

    /// Register `field` as an alias of `column`
    pub fn with(mut self, field: impl Into<String>, column: impl Into<String>, kind: FieldKind) -> Self {
        self.columns.insert(field.into(), Column::new(column, kind));
        self
    }

    /// Resolve `field`; the flag is `true` when the default column was substituted
    pub fn resolve_column(&self, field: &str) -> (&Column, bool) {
        match self.columns.get(field) {
            Some(column) => (column, false),
            None => (&self.default, true),
        }
    }

    pub fn id_column(&self) -> &Column {
        &self.id
    }

    pub fn default_column(&self) -> &Column {
        &self.default
    }
}
