//! Scan error types.
//!
//! `ScanError` ends a scan. `ParseError` and `ScanWarning` never do: a file
//! that fails to read or parse is skipped and the problem is carried along
//! with the results.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use dotmap_core::enums::ScanPhase;
use dotmap_db::error::DatabaseError;

/// Errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The repository root is missing or not a directory.
    #[error("Repository path does not exist or is not a directory: {}", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] dotmap_config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Scan cancelled")]
    Cancelled,

    /// The background task panicked or could not be joined.
    #[error("Scan worker failed: {0}")]
    Worker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single manifest could not be used.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },
}

impl ParseError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. } | Self::Xml { path, .. } => path,
        }
    }
}

/// A non-fatal problem recorded during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub phase: ScanPhase,
    pub path: Option<PathBuf>,
    pub message: String,
}

impl ScanWarning {
    pub fn new(phase: ScanPhase, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            phase,
            path,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_parse(phase: ScanPhase, err: &ParseError) -> Self {
        Self::new(phase, Some(err.path().clone()), err.to_string())
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}
