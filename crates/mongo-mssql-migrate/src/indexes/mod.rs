//! Mirroring of source indexes onto destination columns.
//!
//! Each schema field referenced by any source index key gets its own
//! single-column index `IX_<table>_<field>`. Compound indexes are not
//! reproduced: a field that is part of a compound key is indexed on its own.
//! Creation is unconditional, so re-running against a destination that
//! already has the index fails with a duplicate-object error.
//!
//! Text fields map to `NVARCHAR(MAX)`, which SQL Server refuses as an index
//! key column (error 1919). Every MongoDB collection carries the `_id_` index
//! and `_id` is an ObjectId stored as text, so against a real server the
//! default run fails on `IX_<table>__id` and rolls back. Set
//! `migration.mirror_indexes: false` when migrating collections with `_id`.

use tracing::{debug, info};

use crate::core::{Destination, IndexDescriptor, SchemaMap};
use crate::dialect::MssqlDialect;
use crate::error::Result;

/// Build the CREATE INDEX statements for the schema fields that are indexed at the source.
pub fn build_index_statements(
    dialect: &MssqlDialect,
    table: &str,
    schema: &SchemaMap,
    source_indexes: &[IndexDescriptor],
) -> Vec<String> {
    if source_indexes.is_empty() {
        return Vec::new();
    }

    schema
        .field_names()
        .filter(|field| source_indexes.iter().any(|idx| idx.references(field)))
        .map(|field| {
            let index_name = format!("IX_{}_{}", table, field);
            format!(
                "CREATE INDEX {} ON {}({})",
                dialect.ident(&index_name),
                dialect.ident(table),
                dialect.ident(field)
            )
        })
        .collect()
}

/// Create the mirrored indexes. Returns the number of indexes created.
pub async fn mirror_indexes(
    dialect: &MssqlDialect,
    schema: &SchemaMap,
    table: &str,
    source_indexes: &[IndexDescriptor],
    destination: &mut dyn Destination,
) -> Result<usize> {
    let statements = build_index_statements(dialect, table, schema, source_indexes);

    for statement in &statements {
        debug!("{}", statement);
        destination.execute(statement).await?;
    }

    if !statements.is_empty() {
        info!("Created {} indexes on {}", statements.len(), table);
    }
    Ok(statements.len())
}
