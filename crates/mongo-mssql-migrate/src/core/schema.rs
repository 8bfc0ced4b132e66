//! Schema types: inferred field kinds, destination column types and source
//! index descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::ValueKind;

/// Destination column type. Closed set: every inferred field maps to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Integer32,
    DateTime,
    Boolean,
    Decimal,
    Integer64,
    Binary,
}

impl ColumnType {
    /// SQL Server column type declaration.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "NVARCHAR(MAX)",
            ColumnType::Integer32 => "INT",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Boolean => "BIT",
            ColumnType::Decimal => "DECIMAL(38,18)",
            ColumnType::Integer64 => "BIGINT",
            ColumnType::Binary => "VARBINARY(MAX)",
        }
    }

    /// All column types, in declaration order.
    pub const ALL: [ColumnType; 7] = [
        ColumnType::Text,
        ColumnType::Integer32,
        ColumnType::DateTime,
        ColumnType::Boolean,
        ColumnType::Decimal,
        ColumnType::Integer64,
        ColumnType::Binary,
    ];
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// Ordered field name → value kind mapping inferred for one collection.
///
/// Iteration order is the order in which fields were first recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMap {
    fields: Vec<(String, ValueKind)>,
}

impl SchemaMap {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field if absent. Returns false if the field was already recorded.
    pub fn record(&mut self, name: &str, kind: ValueKind) -> bool {
        if self.contains(name) {
            return false;
        }
        self.fields.push((name.to_string(), kind));
        true
    }

    /// Replace the kind of an existing field, keeping its position.
    pub fn set_kind(&mut self, name: &str, kind: ValueKind) {
        if let Some((_, slot)) = self.fields.iter_mut().find(|(n, _)| n == name) {
            *slot = kind;
        }
    }

    /// Kind recorded for a field.
    pub fn get(&self, name: &str) -> Option<&ValueKind> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, k)| k)
    }

    /// Check whether a field is part of the schema.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate `(field, kind)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueKind)> {
        self.fields.iter().map(|(n, k)| (n.as_str(), k))
    }

    /// Field names in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ValueKind)> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = (S, ValueKind)>>(iter: I) -> Self {
        let mut schema = SchemaMap::new();
        for (name, kind) in iter {
            let name = name.into();
            schema.record(&name, kind);
        }
        schema
    }
}

/// Source-side index specification.
///
/// Only the flat list of referenced field names is kept; compound key
/// structure and sort direction are not reproduced at the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Source index name (e.g. `_id_`).
    pub name: String,

    /// Field names referenced by the index key specification.
    pub keys: Vec<String>,
}

impl IndexDescriptor {
    pub fn new(name: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            name: name.into(),
            keys,
        }
    }

    /// Check if the index references a field.
    pub fn references(&self, field: &str) -> bool {
        self.keys.iter().any(|k| k == field)
    }
}
