//! # mongo-mssql-migrate
//!
//! One-shot MongoDB to SQL Server migration library.
//!
//! For each configured collection the library:
//!
//! - **Infers a schema** from the documents (first-seen kind per field by default)
//! - **Creates the table** if the destination catalog does not have it
//! - **Mirrors source indexes** as single-column indexes
//! - **Inserts every document** as one row, arrays stored as JSON text
//!
//! Everything runs inside one destination transaction that is committed at
//! the end or rolled back on the first failure.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mongo_mssql_migrate::{run_migration, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let result = run_migration(config).await?;
//!     println!("Inserted {} rows", result.rows_inserted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod format;
pub mod indexes;
pub mod infer;
pub mod insert;
pub mod normalize;
pub mod orchestrator;
pub mod source;
pub mod target;
pub mod typemap;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, SourceConfig, TargetConfig};
pub use core::{
    ColumnType, Destination, Document, DocumentSource, DocumentValue, IndexDescriptor, SchemaMap,
    ValueKind,
};
pub use dialect::MssqlDialect;
pub use error::{MigrateError, Result};
pub use infer::{infer_schema, infer_schema_with, InferencePolicy, SchemaPolicy};
pub use orchestrator::{
    health_check, plan_migration, run_migration, CollectionPlan, CollectionSummary,
    HealthCheckResult, MigrationResult, Orchestrator,
};
pub use source::MongoSource;
pub use target::MssqlTarget;
