//! Configuration validation.

use std::collections::HashSet;

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.connection_string.trim().is_empty() {
        return Err(MigrateError::Config(
            "source.connection_string is required".into(),
        ));
    }
    if config.source.database.trim().is_empty() {
        return Err(MigrateError::Config("source.database is required".into()));
    }
    if config.source.collections.is_empty() {
        return Err(MigrateError::Config(
            "source.collections must list at least one collection".into(),
        ));
    }

    let mut seen = HashSet::new();
    for name in &config.source.collections {
        if name.trim().is_empty() {
            return Err(MigrateError::Config(
                "source.collections contains an empty name".into(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(MigrateError::Config(format!(
                "source.collections lists '{}' more than once",
                name
            )));
        }
    }

    // Target validation
    if config.target.connection_string.trim().is_empty() {
        return Err(MigrateError::Config(
            "target.connection_string is required".into(),
        ));
    }

    Ok(())
}
