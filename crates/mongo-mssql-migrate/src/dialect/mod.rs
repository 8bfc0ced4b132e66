//! SQL Server identifier rendering.
//!
//! Collection and field names go into DDL/DML verbatim by default. With
//! `quote_identifiers` enabled they are wrapped in brackets so reserved words
//! and names with spaces or dots are accepted by the engine.

use std::borrow::Cow;

/// SQL Server dialect settings used by the statement builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MssqlDialect {
    quote_identifiers: bool,
}

impl MssqlDialect {
    /// Dialect that emits identifiers verbatim.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dialect that bracket-quotes every identifier.
    pub fn quoted() -> Self {
        Self {
            quote_identifiers: true,
        }
    }

    /// Build from the `quote_identifiers` setting.
    pub fn with_quoting(quote_identifiers: bool) -> Self {
        Self { quote_identifiers }
    }

    /// Render an identifier (table, column or index name).
    pub fn ident<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.quote_identifiers {
            Cow::Owned(format!("[{}]", name.replace(']', "]]")))
        } else {
            Cow::Borrowed(name)
        }
    }
}
