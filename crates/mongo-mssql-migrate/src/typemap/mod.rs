//! Type mapping from document value kinds to SQL Server column types.

use crate::core::{ColumnType, ValueKind};
use crate::error::{MigrateError, Result};

/// Map a document value kind to its destination column type.
///
/// Arrays are stored as their JSON text and identifiers as their canonical
/// text, so both land in `NVARCHAR(MAX)`. Nested documents and kinds outside
/// the mapping table fail with [`MigrateError::UnsupportedType`].
pub fn map_type(kind: &ValueKind) -> Result<ColumnType> {
    match kind {
        ValueKind::String
        | ValueKind::Null
        | ValueKind::Array
        | ValueKind::ObjectId
        | ValueKind::Guid => Ok(ColumnType::Text),
        ValueKind::Int32 => Ok(ColumnType::Integer32),
        ValueKind::DateTime => Ok(ColumnType::DateTime),
        ValueKind::Boolean => Ok(ColumnType::Boolean),
        ValueKind::Double | ValueKind::Decimal => Ok(ColumnType::Decimal),
        ValueKind::Int64 => Ok(ColumnType::Integer64),
        ValueKind::Binary => Ok(ColumnType::Binary),
        ValueKind::Document | ValueKind::Unsupported(_) => {
            Err(MigrateError::unsupported_type(kind.name()))
        }
    }
}
