//! MongoDB source operations.

mod convert;

pub use convert::{decimal128_to_decimal, from_bson, from_bson_document};

use crate::config::SourceConfig;
use crate::core::{Document, DocumentSource, IndexDescriptor};
use crate::error::{MigrateError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document as BsonDocument};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::{debug, info};

/// Server error code for a collection that does not exist.
const NAMESPACE_NOT_FOUND: i32 = 26;

/// MongoDB document source bound to one database.
pub struct MongoSource {
    client: Client,
    database: Database,
}

impl MongoSource {
    /// Connect to MongoDB and verify the connection with a `ping`.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.connection_string).await?;
        if options.app_name.is_none() {
            options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        }

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        // Test connection
        database.run_command(doc! { "ping": 1 }, None).await?;

        info!(
            "Connected to MongoDB source: database {} ({} collections requested)",
            config.database,
            config.collections.len()
        );

        Ok(Self { client, database })
    }

    /// Close the underlying client.
    pub async fn close(self) {
        self.client.shutdown().await;
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        let cursor = self
            .database
            .collection::<BsonDocument>(collection)
            .find(None, None)
            .await
            .map_err(|e| MigrateError::source_fetch(collection, e))?;

        let raw: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| MigrateError::source_fetch(collection, e))?;

        debug!("Fetched {} documents from {}", raw.len(), collection);
        Ok(raw.iter().map(from_bson_document).collect())
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexDescriptor>> {
        let cursor = match self
            .database
            .collection::<BsonDocument>(collection)
            .list_indexes(None)
            .await
        {
            Ok(cursor) => cursor,
            Err(e) if is_namespace_not_found(&e) => {
                debug!("Collection {} does not exist, no indexes to list", collection);
                return Ok(Vec::new());
            }
            Err(e) => return Err(MigrateError::source_fetch(collection, e)),
        };

        let models: Vec<mongodb::IndexModel> = cursor
            .try_collect()
            .await
            .map_err(|e| MigrateError::source_fetch(collection, e))?;

        let indexes: Vec<IndexDescriptor> = models
            .into_iter()
            .map(|model| {
                let name = model
                    .options
                    .and_then(|opts| opts.name)
                    .unwrap_or_default();
                IndexDescriptor::new(name, model.keys.keys().cloned().collect())
            })
            .collect();

        debug!("Loaded {} indexes for {}", indexes.len(), collection);
        Ok(indexes)
    }

    fn db_type(&self) -> &str {
        "mongodb"
    }
}

fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    matches!(&*err.kind, ErrorKind::Command(cmd) if cmd.code == NAMESPACE_NOT_FOUND)
}
