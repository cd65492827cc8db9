//! Entity structs for every node of the build graph.
//!
//! Entities are keyed by their natural keys (identifier, path, or name and
//! version) so a scan can be assembled in memory before anything is stored.
//! Persisted rows come back wrapped in [`Stored`], which adds the row id and
//! the owning scan id.

mod assembly;
mod event;
mod package;
mod project;
mod scan;
mod solution;

use serde::{Deserialize, Serialize};

pub use assembly::Assembly;
pub use event::ScanEvent;
pub use package::Package;
pub use project::Project;
pub use scan::{NewScan, Revision, Scan};
pub use solution::Solution;

/// A persisted entity with its row id and owning scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stored<T> {
    pub id: i64,
    pub scan_id: i64,
    #[serde(flatten)]
    pub item: T,
}
