//! Cross-cutting error types for dotmap.
//!
//! Domain-specific errors (`DatabaseError`, `ScanError`, `ConfigError`) are
//! defined in their respective crates and converge in `dotmap-cli`.

use thiserror::Error;

/// Errors raised by dotmap-core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored tag string does not name any variant of its enum.
    #[error("Unknown {kind} tag: '{value}'")]
    UnknownTag { kind: &'static str, value: String },
}
