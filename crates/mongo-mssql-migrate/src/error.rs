//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document value kind has no entry in the column type mapping table.
    #[error("Unsupported column type: {kind}")]
    UnsupportedType { kind: String },

    /// A value reached the literal formatter that cannot be rendered as a SQL literal.
    #[error(
        "Unsupported value of kind {kind}{}",
        .field.as_ref().map(|f| format!(" in field {}", f)).unwrap_or_default()
    )]
    UnsupportedValue { kind: String, field: Option<String> },

    /// Failed to read documents or index descriptors from the source.
    #[error("Source fetch failed for collection {collection}: {source}")]
    SourceFetch {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// Source connection error.
    #[error("Source database error: {0}")]
    Source(#[from] mongodb::error::Error),

    /// The destination rejected a DDL, index or insert statement.
    #[error("Destination execution failed: {source}\n  Statement: {statement}")]
    DestinationExecution {
        statement: String,
        #[source]
        source: tiberius::error::Error,
    },

    /// Destination connection or transaction-control error.
    #[error("Destination database error: {0}")]
    Destination(#[from] tiberius::error::Error),

    /// Transaction used out of order (commit without begin, nested begin, ...).
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create an UnsupportedType error for the given kind name.
    pub fn unsupported_type(kind: impl Into<String>) -> Self {
        MigrateError::UnsupportedType { kind: kind.into() }
    }

    /// Create an UnsupportedValue error.
    pub fn unsupported_value(kind: impl Into<String>) -> Self {
        MigrateError::UnsupportedValue {
            kind: kind.into(),
            field: None,
        }
    }

    /// Attach the field name to an UnsupportedValue error; other errors pass through.
    pub fn in_field(self, name: &str) -> Self {
        match self {
            MigrateError::UnsupportedValue { kind, field: None } => {
                MigrateError::UnsupportedValue {
                    kind,
                    field: Some(name.to_string()),
                }
            }
            other => other,
        }
    }

    /// Wrap a source error with the collection it occurred on.
    pub fn source_fetch(collection: impl Into<String>, source: mongodb::error::Error) -> Self {
        MigrateError::SourceFetch {
            collection: collection.into(),
            source,
        }
    }

    /// Wrap a destination error with the statement that triggered it.
    pub fn execution(statement: impl Into<String>, source: tiberius::error::Error) -> Self {
        MigrateError::DestinationExecution {
            statement: statement.into(),
            source,
        }
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) | MigrateError::Json(_) => 1,
            MigrateError::SourceFetch { .. } | MigrateError::Source(_) => 2,
            MigrateError::DestinationExecution { .. }
            | MigrateError::Destination(_)
            | MigrateError::Transaction(_) => 3,
            MigrateError::UnsupportedType { .. } | MigrateError::UnsupportedValue { .. } => 4,
            MigrateError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
