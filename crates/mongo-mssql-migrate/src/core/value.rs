//! Document value types read from the source collections.
//!
//! A [`Document`] is an ordered field → [`DocumentValue`] mapping. Field order
//! is the order in which the source yielded the elements and is preserved
//! through normalization.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single value inside a source document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    /// Explicit null (also used for BSON `undefined`).
    Null,

    /// UTF-8 string.
    String(String),

    /// 32-bit signed integer.
    Int32(i32),

    /// 64-bit signed integer.
    Int64(i64),

    /// 64-bit floating point.
    Double(f64),

    /// Exact decimal.
    Decimal(Decimal),

    /// Boolean value.
    Boolean(bool),

    /// UTC timestamp with millisecond precision.
    DateTime(DateTime<Utc>),

    /// Generic binary payload.
    Binary(Vec<u8>),

    /// 12-byte document-store object identifier.
    ObjectId([u8; 12]),

    /// UUID/GUID value.
    Guid(Uuid),

    /// Ordered list of values.
    Array(Vec<DocumentValue>),

    /// Nested document.
    Document(Document),

    /// A source value with no counterpart in the closed value set.
    ///
    /// `kind` is the source type name, `text` a display rendering.
    Unsupported { kind: String, text: String },
}

/// Tag of a [`DocumentValue`], used as the schema entry for a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    String,
    Int32,
    Int64,
    Double,
    Decimal,
    Boolean,
    DateTime,
    Binary,
    ObjectId,
    Guid,
    Array,
    Document,
    Unsupported(String),
}

impl ValueKind {
    /// Human-readable kind name, used in error messages.
    pub fn name(&self) -> &str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::String => "String",
            ValueKind::Int32 => "Int32",
            ValueKind::Int64 => "Int64",
            ValueKind::Double => "Double",
            ValueKind::Decimal => "Decimal",
            ValueKind::Boolean => "Boolean",
            ValueKind::DateTime => "DateTime",
            ValueKind::Binary => "Binary",
            ValueKind::ObjectId => "ObjectId",
            ValueKind::Guid => "Guid",
            ValueKind::Array => "Array",
            ValueKind::Document => "Document",
            ValueKind::Unsupported(name) => name,
        }
    }

    /// Whether the kind is one of the numeric kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueKind::Int32 | ValueKind::Int64 | ValueKind::Double | ValueKind::Decimal
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DocumentValue {
    /// Get the kind tag of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            DocumentValue::Null => ValueKind::Null,
            DocumentValue::String(_) => ValueKind::String,
            DocumentValue::Int32(_) => ValueKind::Int32,
            DocumentValue::Int64(_) => ValueKind::Int64,
            DocumentValue::Double(_) => ValueKind::Double,
            DocumentValue::Decimal(_) => ValueKind::Decimal,
            DocumentValue::Boolean(_) => ValueKind::Boolean,
            DocumentValue::DateTime(_) => ValueKind::DateTime,
            DocumentValue::Binary(_) => ValueKind::Binary,
            DocumentValue::ObjectId(_) => ValueKind::ObjectId,
            DocumentValue::Guid(_) => ValueKind::Guid,
            DocumentValue::Array(_) => ValueKind::Array,
            DocumentValue::Document(_) => ValueKind::Document,
            DocumentValue::Unsupported { kind, .. } => ValueKind::Unsupported(kind.clone()),
        }
    }

    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, DocumentValue::Null)
    }

    /// Hex rendering of an object identifier (24 lowercase hex chars).
    pub fn object_id_hex(bytes: &[u8; 12]) -> String {
        hex::encode(bytes)
    }
}

impl From<&str> for DocumentValue {
    fn from(v: &str) -> Self {
        DocumentValue::String(v.to_string())
    }
}

impl From<String> for DocumentValue {
    fn from(v: String) -> Self {
        DocumentValue::String(v)
    }
}

impl From<i32> for DocumentValue {
    fn from(v: i32) -> Self {
        DocumentValue::Int32(v)
    }
}

impl From<i64> for DocumentValue {
    fn from(v: i64) -> Self {
        DocumentValue::Int64(v)
    }
}

impl From<f64> for DocumentValue {
    fn from(v: f64) -> Self {
        DocumentValue::Double(v)
    }
}

impl From<bool> for DocumentValue {
    fn from(v: bool) -> Self {
        DocumentValue::Boolean(v)
    }
}

impl From<Decimal> for DocumentValue {
    fn from(v: Decimal) -> Self {
        DocumentValue::Decimal(v)
    }
}

impl From<DateTime<Utc>> for DocumentValue {
    fn from(v: DateTime<Utc>) -> Self {
        DocumentValue::DateTime(v)
    }
}

impl From<Uuid> for DocumentValue {
    fn from(v: Uuid) -> Self {
        DocumentValue::Guid(v)
    }
}

impl From<Vec<u8>> for DocumentValue {
    fn from(v: Vec<u8>) -> Self {
        DocumentValue::Binary(v)
    }
}

impl From<Document> for DocumentValue {
    fn from(v: Document) -> Self {
        DocumentValue::Document(v)
    }
}

/// Ordered mapping from field name to value with unique field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, DocumentValue)>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. An existing field keeps its position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DocumentValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DocumentValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a field value.
    pub fn get(&self, name: &str) -> Option<&DocumentValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Check whether the document has a field.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate fields in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Field names in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<DocumentValue>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, DocumentValue);
    type IntoIter = std::vec::IntoIter<(String, DocumentValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
