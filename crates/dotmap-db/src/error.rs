//! Database error types for dotmap-db.

use thiserror::Error;

/// Errors from graph store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The write would break graph coherence (e.g. an edge to an unknown node).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A stored value could not be decoded into a core type.
    #[error(transparent)]
    Core(#[from] dotmap_core::errors::CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
