//! Destination database operations.

mod mssql;

pub use mssql::MssqlTarget;
