//! Database schema, migrations, and query builders.
//!
//! Builders return `(sql, values)` pairs for SQLite; the server binds and
//! executes them.

pub mod invite_codes;
pub mod migrations;
pub mod sessions;
pub mod tables;
pub mod users;

// Re-export tables for convenience
pub use tables::*;

/// A built statement: SQL text plus its positional bind values.
pub type Built = (String, sea_query::Values);
