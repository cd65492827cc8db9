//! Best-effort source-control revision lookup.
//!
//! Any failure (no repository, unborn branch, unreadable refs) yields the
//! `"N/A"` revision instead of an error.

use std::path::Path;

use tracing::{debug, warn};

use dotmap_core::entities::Revision;

/// Commit checked out in the repository containing `root`.
#[must_use]
pub fn read_revision(root: &Path) -> Revision {
    let repo = match gix::discover(root) {
        Ok(repo) => repo,
        Err(err) => {
            debug!(root = %root.display(), error = %err, "no git repository");
            return Revision::unavailable();
        }
    };
    match repo.head_id() {
        Ok(id) => Revision::from_commit(&id.to_string()),
        Err(err) => {
            warn!(root = %root.display(), error = %err, "cannot resolve HEAD");
            Revision::unavailable()
        }
    }
}
