//! Destination wrapper for dry runs.

use async_trait::async_trait;
use tracing::info;

use crate::core::Destination;
use crate::error::Result;

/// Forwards catalog checks and transaction control to the wrapped destination
/// but only logs the statements handed to [`execute`](Destination::execute).
pub struct DryRunDestination<'a> {
    inner: &'a mut dyn Destination,
    statements: Vec<String>,
}

impl<'a> DryRunDestination<'a> {
    pub fn new(inner: &'a mut dyn Destination) -> Self {
        Self {
            inner,
            statements: Vec::new(),
        }
    }

    /// Statements that would have been executed, in order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }
}

#[async_trait]
impl Destination for DryRunDestination<'_> {
    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        self.inner.table_exists(table).await
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        info!("[dry-run] {}", sql);
        self.statements.push(sql.to_string());
        Ok(())
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        self.inner.begin_transaction().await
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.inner.rollback().await
    }

    fn db_type(&self) -> &str {
        self.inner.db_type()
    }
}
