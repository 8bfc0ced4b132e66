//! SQL Server destination over a single tiberius connection.

use crate::config::{redact_connection_string, TargetConfig};
use crate::core::Destination;
use crate::error::{MigrateError, Result};
use async_trait::async_trait;
use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

/// SQL Server destination.
///
/// Every statement runs as a plain SQL batch on the same connection, so the
/// transaction opened by [`begin_transaction`](Destination::begin_transaction)
/// spans the whole run.
pub struct MssqlTarget {
    client: Client<Compat<TcpStream>>,
    in_transaction: bool,
}

impl MssqlTarget {
    /// Connect using an ADO.NET-style connection string.
    pub async fn connect(config: &TargetConfig) -> Result<Self> {
        let tds_config = Config::from_ado_string(&config.connection_string)
            .map_err(|e| MigrateError::Config(format!("Invalid target.connection_string: {}", e)))?;

        let tcp = TcpStream::connect(tds_config.get_addr())
            .await
            .map_err(|e| tiberius::error::Error::Io {
                kind: e.kind(),
                message: e.to_string(),
            })?;

        tcp.set_nodelay(true).ok();

        let mut client = Client::connect(tds_config, tcp.compat_write()).await?;

        // Test connection
        client.simple_query("SELECT 1").await?.into_row().await?;

        info!(
            "Connected to MSSQL target: {}",
            redact_connection_string(&config.connection_string)
        );

        Ok(Self {
            client,
            in_transaction: false,
        })
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    /// Run a batch and drain its result sets.
    async fn batch(&mut self, sql: &str) -> tiberius::Result<()> {
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }
}

#[async_trait]
impl Destination for MssqlTarget {
    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        let query = r#"SELECT COUNT(*)
               FROM INFORMATION_SCHEMA.TABLES
               WHERE TABLE_NAME = @P1 AND TABLE_TYPE = 'BASE TABLE'"#;
        let row = self
            .client
            .query(query, &[&table])
            .await?
            .into_row()
            .await?;
        let count: i32 = row.and_then(|r| r.get(0)).unwrap_or(0);
        debug!("Table {} exists: {}", table, count > 0);
        Ok(count > 0)
    }

    async fn execute(&mut self, sql: &str) -> Result<()> {
        debug!("Executing: {}", sql);
        self.batch(sql)
            .await
            .map_err(|e| MigrateError::execution(sql, e))
    }

    async fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction {
            return Err(MigrateError::Transaction(
                "a transaction is already open".into(),
            ));
        }
        self.batch("BEGIN TRANSACTION").await?;
        self.in_transaction = true;
        debug!("Transaction started");
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(MigrateError::Transaction(
                "commit without an open transaction".into(),
            ));
        }
        self.batch("COMMIT TRANSACTION").await?;
        self.in_transaction = false;
        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(MigrateError::Transaction(
                "rollback without an open transaction".into(),
            ));
        }
        // The server may already have aborted the transaction; the flag is cleared either way
        self.in_transaction = false;
        self.batch("IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION").await?;
        debug!("Transaction rolled back");
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mssql"
    }
}
