//! Core abstractions for the document-to-relational migration.
//!
//! - [`value`]: document values and ordered documents
//! - [`schema`]: inferred schema maps, column types and index descriptors
//! - [`traits`]: source and destination collaborator traits
//!
//! Everything the SQL synthesis pipeline consumes is defined here, independent
//! of the MongoDB and SQL Server drivers.

pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{ColumnType, IndexDescriptor, SchemaMap};
pub use traits::{Destination, DocumentSource};
pub use value::{Document, DocumentValue, ValueKind};
