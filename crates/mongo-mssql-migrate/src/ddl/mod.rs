//! CREATE TABLE generation from an inferred schema.

use tracing::{debug, info, warn};

use crate::core::{Destination, SchemaMap};
use crate::dialect::MssqlDialect;
use crate::error::Result;
use crate::typemap::map_type;

/// Build the CREATE TABLE statement for a schema.
///
/// Columns follow schema order. Every field kind is mapped before any text is
/// produced, so an unmapped kind fails the whole statement.
pub fn build_create_table(dialect: &MssqlDialect, table: &str, schema: &SchemaMap) -> Result<String> {
    let col_defs = schema
        .iter()
        .map(|(name, kind)| {
            let column_type = map_type(kind)?;
            Ok(format!("{} {}", dialect.ident(name), column_type.sql_type()))
        })
        .collect::<Result<Vec<String>>>()?;

    Ok(format!(
        "CREATE TABLE {} ({})",
        dialect.ident(table),
        col_defs.join(", ")
    ))
}

/// Create the table if the destination catalog does not have it yet.
///
/// Returns true if the table was created. An existing table is left as-is;
/// its columns are not compared with the schema.
pub async fn ensure_table(
    dialect: &MssqlDialect,
    schema: &SchemaMap,
    table: &str,
    destination: &mut dyn Destination,
) -> Result<bool> {
    if destination.table_exists(table).await? {
        debug!("Table {} already exists, skipping creation", table);
        return Ok(false);
    }

    if schema.is_empty() {
        warn!("No fields inferred for {}, table not created", table);
        return Ok(false);
    }

    let ddl = build_create_table(dialect, table, schema)?;
    debug!("{}", ddl);
    destination.execute(&ddl).await?;
    info!("Created table {} ({} columns)", table, schema.len());
    Ok(true)
}
