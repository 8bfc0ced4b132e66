//! INSERT statement generation, one statement per document.
//!
//! Columns are emitted in schema order so every statement for a collection
//! lists its columns the same way. Schema fields missing from a document are
//! left out and take the column default (NULL). Document fields that are not
//! in the schema are skipped with a warning.

use tracing::warn;

use crate::core::{Document, SchemaMap};
use crate::dialect::MssqlDialect;
use crate::error::Result;
use crate::format::format_literal;

/// A generated INSERT plus the document fields left out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// SQL text.
    pub sql: String,

    /// Document fields absent from the schema.
    pub skipped_fields: Vec<String>,
}

/// Build the INSERT statement for one (normalized) document.
///
/// Values are formatted by their own runtime kind, which can differ from the
/// kind recorded in the schema for that field.
pub fn build_insert(
    dialect: &MssqlDialect,
    table: &str,
    schema: &SchemaMap,
    document: &Document,
) -> Result<InsertStatement> {
    let skipped_fields: Vec<String> = document
        .keys()
        .filter(|name| !schema.contains(name))
        .map(str::to_string)
        .collect();
    for field in &skipped_fields {
        warn!("Column {} not found in the schema of {}, skipping", field, table);
    }

    let mut columns = Vec::with_capacity(schema.len());
    let mut values = Vec::with_capacity(schema.len());
    for name in schema.field_names() {
        if let Some(value) = document.get(name) {
            columns.push(dialect.ident(name).into_owned());
            values.push(format_literal(value).map_err(|e| e.in_field(name))?);
        }
    }

    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", dialect.ident(table))
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.ident(table),
            columns.join(","),
            values.join(",")
        )
    };

    Ok(InsertStatement {
        sql,
        skipped_fields,
    })
}
