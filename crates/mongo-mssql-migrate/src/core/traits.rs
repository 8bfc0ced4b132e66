//! Collaborator traits for the migration pipeline.
//!
//! - [`DocumentSource`]: reads documents and index descriptors from the document store
//! - [`Destination`]: catalog checks, statement execution and transaction control
//!
//! The pipeline components only ever see these traits, so the core logic can
//! be exercised with in-memory implementations.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::IndexDescriptor;
use super::value::Document;

/// Read documents from the source document store.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch every document of a collection, in cursor order.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// List the index descriptors defined on a collection.
    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexDescriptor>>;

    /// Get the source type identifier (e.g., "mongodb").
    fn db_type(&self) -> &str;
}

/// Write schema and rows to the destination relational store.
///
/// All statements run on a single connection inside the transaction opened
/// with [`begin_transaction`](Destination::begin_transaction). Only the
/// orchestrator calls the transaction-control methods.
#[async_trait]
pub trait Destination: Send {
    /// Check if a table exists in the destination catalog.
    async fn table_exists(&mut self, table: &str) -> Result<bool>;

    /// Execute a statement that returns no rows.
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Open the run-wide transaction.
    async fn begin_transaction(&mut self) -> Result<()>;

    /// Commit the run-wide transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the run-wide transaction.
    async fn rollback(&mut self) -> Result<()>;

    /// Get the destination type identifier (e.g., "mssql").
    fn db_type(&self) -> &str;
}
