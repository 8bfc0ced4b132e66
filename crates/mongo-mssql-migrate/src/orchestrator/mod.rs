//! Migration orchestrator - main workflow coordinator.
//!
//! One destination transaction spans the whole run. Collections are migrated
//! one at a time in configuration order, documents one at a time in cursor
//! order. The first failure rolls back everything written so far.

mod dry_run;

pub use dry_run::DryRunDestination;

use crate::config::Config;
use crate::core::{Document, DocumentSource, Destination, IndexDescriptor};
use crate::ddl::{build_create_table, ensure_table};
use crate::dialect::MssqlDialect;
use crate::error::{MigrateError, Result};
use crate::indexes::{build_index_statements, mirror_indexes};
use crate::infer::{infer_schema_with, InferencePolicy};
use crate::insert::build_insert;
use crate::normalize::normalize;
use crate::source::MongoSource;
use crate::target::MssqlTarget;
use crate::typemap::map_type;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Migration orchestrator.
pub struct Orchestrator<S, D> {
    config: Config,
    source: S,
    target: D,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status ("completed" or "dry_run").
    pub status: String,

    /// Statements were logged only and the transaction rolled back.
    pub dry_run: bool,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Collections processed.
    pub collections_total: usize,

    /// Documents read from the source.
    pub documents_total: usize,

    /// Rows inserted at the destination.
    pub rows_inserted: usize,

    /// Tables created.
    pub tables_created: usize,

    /// Indexes created.
    pub indexes_created: usize,

    /// Per-collection details, in migration order.
    pub collections: Vec<CollectionSummary>,
}

/// Outcome of migrating one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Collection (and table) name.
    pub collection: String,

    /// Documents fetched.
    pub documents: usize,

    /// INSERT statements executed.
    pub rows_inserted: usize,

    /// False when the table already existed (or the schema was empty).
    pub table_created: bool,

    /// Mirrored indexes created.
    pub indexes_created: usize,

    /// Inferred column names, in schema order.
    pub columns: Vec<String>,

    /// Document fields left out of inserts because the schema lacks them.
    pub skipped_fields: Vec<String>,
}

/// Statements a migration would issue for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionPlan {
    pub collection: String,
    pub documents: usize,
    pub columns: Vec<PlannedColumn>,

    /// None when no fields were inferred or a field kind has no column type.
    pub create_table: Option<String>,
    pub index_statements: Vec<String>,

    /// Mapping failure that would abort a real run.
    pub error: Option<String>,
}

/// One inferred column in a [`CollectionPlan`].
#[derive(Debug, Clone, Serialize)]
pub struct PlannedColumn {
    pub name: String,
    pub kind: String,
    /// None if the kind has no column type.
    pub sql_type: Option<String>,
}

/// Connectivity report for both endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub source_connected: bool,
    pub source_latency_ms: u64,
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    pub target_error: Option<String>,
}

impl<S: DocumentSource, D: Destination> Orchestrator<S, D> {
    /// Create a new orchestrator over connected collaborators.
    pub fn new(config: Config, source: S, target: D) -> Self {
        Self {
            config,
            source,
            target,
        }
    }

    /// The document source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The destination.
    pub fn target(&self) -> &D {
        &self.target
    }

    /// Take the collaborators back, e.g. to close connections.
    pub fn into_parts(self) -> (S, D) {
        (self.source, self.target)
    }

    /// Run the migration.
    ///
    /// Commits once after every collection succeeded. On failure the whole
    /// transaction is rolled back and the original error returned; a failing
    /// rollback is logged and does not replace it.
    pub async fn run(&mut self) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let dry_run = self.config.migration.dry_run;

        info!(
            "Starting migration run: {} ({} -> {}{})",
            run_id,
            self.source.db_type(),
            self.target.db_type(),
            if dry_run { ", dry run" } else { "" }
        );

        self.target.begin_transaction().await?;

        let collections = match self.migrate_collections().await {
            Ok(collections) => collections,
            Err(e) => {
                self.abort(&e).await;
                return Err(e);
            }
        };

        let status = if dry_run {
            self.target.rollback().await?;
            info!("Dry run finished, transaction rolled back");
            "dry_run"
        } else {
            if let Err(e) = self.target.commit().await {
                self.abort(&e).await;
                return Err(e);
            }
            "completed"
        };

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let result = MigrationResult {
            run_id,
            status: status.to_string(),
            dry_run,
            duration_seconds: duration,
            started_at,
            completed_at,
            collections_total: collections.len(),
            documents_total: collections.iter().map(|c| c.documents).sum(),
            rows_inserted: collections.iter().map(|c| c.rows_inserted).sum(),
            tables_created: collections.iter().filter(|c| c.table_created).count(),
            indexes_created: collections.iter().map(|c| c.indexes_created).sum(),
            collections,
        };

        info!(
            "Migration {}: {} collections, {} rows in {:.2}s",
            result.status, result.collections_total, result.rows_inserted, result.duration_seconds
        );

        Ok(result)
    }

    async fn migrate_collections(&mut self) -> Result<Vec<CollectionSummary>> {
        let dialect = MssqlDialect::with_quoting(self.config.migration.quote_identifiers);
        let policy = self.config.migration.schema_policy.strategy();
        let mirror = self.config.migration.mirror_indexes;
        debug!("Schema policy: {}", policy.name());

        let source = &self.source;
        let mut dry_run_target;
        let target: &mut dyn Destination = if self.config.migration.dry_run {
            dry_run_target = DryRunDestination::new(&mut self.target);
            &mut dry_run_target
        } else {
            &mut self.target
        };

        let mut summaries = Vec::with_capacity(self.config.source.collections.len());
        for collection in &self.config.source.collections {
            let summary = migrate_collection(
                source,
                &mut *target,
                &dialect,
                policy.as_ref(),
                mirror,
                collection,
            )
            .await?;
            summaries.push(summary);
        }
        Ok(summaries)
    }

    async fn abort(&mut self, cause: &MigrateError) {
        error!("Migration failed, rolling back: {}", cause);
        if let Err(e) = self.target.rollback().await {
            error!("Rollback failed: {}", e);
        }
    }
}

async fn migrate_collection(
    source: &dyn DocumentSource,
    target: &mut dyn Destination,
    dialect: &MssqlDialect,
    policy: &dyn InferencePolicy,
    mirror: bool,
    collection: &str,
) -> Result<CollectionSummary> {
    info!("Migrating collection {}", collection);

    let documents = source.fetch_all(collection).await?;
    let schema = infer_schema_with(policy, &documents);
    debug!(
        "Inferred {} fields for {} from {} documents",
        schema.len(),
        collection,
        documents.len()
    );

    let table_created = ensure_table(dialect, &schema, collection, target).await?;

    let indexes_created = if mirror {
        let source_indexes = source.list_indexes(collection).await?;
        mirror_indexes(dialect, &schema, collection, &source_indexes, target).await?
    } else {
        0
    };

    let mut rows_inserted = 0;
    let mut skipped_fields: Vec<String> = Vec::new();
    for document in &documents {
        let normalized = normalize(document);
        let statement = build_insert(dialect, collection, &schema, &normalized)?;
        target.execute(&statement.sql).await?;
        rows_inserted += 1;

        for field in statement.skipped_fields {
            if !skipped_fields.contains(&field) {
                skipped_fields.push(field);
            }
        }
    }

    info!("Inserted {} rows into {}", rows_inserted, collection);

    Ok(CollectionSummary {
        collection: collection.to_string(),
        documents: documents.len(),
        rows_inserted,
        table_created,
        indexes_created,
        columns: schema.field_names().map(str::to_string).collect(),
        skipped_fields,
    })
}

/// Work out the DDL and index statements for a collection without touching
/// the destination.
pub fn plan_collection(
    dialect: &MssqlDialect,
    policy: &dyn InferencePolicy,
    collection: &str,
    documents: &[Document],
    source_indexes: &[IndexDescriptor],
) -> CollectionPlan {
    let schema = infer_schema_with(policy, documents);

    let columns = schema
        .iter()
        .map(|(name, kind)| PlannedColumn {
            name: name.to_string(),
            kind: kind.to_string(),
            sql_type: map_type(kind).ok().map(|t| t.sql_type().to_string()),
        })
        .collect();

    let (create_table, error) = if schema.is_empty() {
        (None, None)
    } else {
        match build_create_table(dialect, collection, &schema) {
            Ok(ddl) => (Some(ddl), None),
            Err(e) => (None, Some(e.to_string())),
        }
    };

    CollectionPlan {
        collection: collection.to_string(),
        documents: documents.len(),
        columns,
        create_table,
        index_statements: build_index_statements(dialect, collection, &schema, source_indexes),
        error,
    }
}

/// Plan every configured collection, or just `only` when given.
pub async fn plan_migration(
    config: &Config,
    source: &dyn DocumentSource,
    only: Option<&str>,
) -> Result<Vec<CollectionPlan>> {
    let dialect = MssqlDialect::with_quoting(config.migration.quote_identifiers);
    let policy = config.migration.schema_policy.strategy();

    let collections: Vec<&str> = match only {
        Some(name) => vec![name],
        None => config.source.collections.iter().map(String::as_str).collect(),
    };

    let mut plans = Vec::with_capacity(collections.len());
    for collection in collections {
        let documents = source.fetch_all(collection).await?;
        let source_indexes = if config.migration.mirror_indexes {
            source.list_indexes(collection).await?
        } else {
            Vec::new()
        };
        plans.push(plan_collection(
            &dialect,
            policy.as_ref(),
            collection,
            &documents,
            &source_indexes,
        ));
    }
    Ok(plans)
}

/// Connect to MongoDB and SQL Server, run the migration and close both connections.
pub async fn run_migration(config: Config) -> Result<MigrationResult> {
    config.validate()?;

    let source = MongoSource::connect(&config.source).await?;
    let target = MssqlTarget::connect(&config.target).await?;

    let mut orchestrator = Orchestrator::new(config, source, target);
    let result = orchestrator.run().await;

    let (source, target) = orchestrator.into_parts();
    source.close().await;
    if let Err(e) = target.close().await {
        warn!("Failed to close target connection: {}", e);
    }

    result
}

/// Test connectivity to both endpoints.
pub async fn health_check(config: &Config) -> HealthCheckResult {
    let start = Instant::now();
    let (source_connected, source_error) = match MongoSource::connect(&config.source).await {
        Ok(source) => {
            source.close().await;
            (true, None)
        }
        Err(e) => (false, Some(e.to_string())),
    };
    let source_latency_ms = start.elapsed().as_millis() as u64;

    let start = Instant::now();
    let (target_connected, target_error) = match MssqlTarget::connect(&config.target).await {
        Ok(target) => match target.close().await {
            Ok(()) => (true, None),
            Err(e) => (true, Some(e.to_string())),
        },
        Err(e) => (false, Some(e.to_string())),
    };
    let target_latency_ms = start.elapsed().as_millis() as u64;

    HealthCheckResult {
        healthy: source_connected && target_connected,
        source_connected,
        source_latency_ms,
        source_error,
        target_connected,
        target_latency_ms,
        target_error,
    }
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
