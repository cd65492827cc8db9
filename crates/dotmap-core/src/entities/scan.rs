use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NOT_AVAILABLE;

/// Length of the abbreviated commit id.
const SHORT_LEN: usize = 8;

/// Source-control revision checked out when a scan ran.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Revision {
    pub commit: String,
    pub short: String,
}

impl Revision {
    #[must_use]
    pub fn from_commit(commit: &str) -> Self {
        let commit = commit.trim().to_string();
        let short = commit.chars().take(SHORT_LEN).collect();
        Self { commit, short }
    }

    /// The sentinel revision recorded when no repository metadata is readable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            commit: NOT_AVAILABLE.to_string(),
            short: NOT_AVAILABLE.to_string(),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.commit != NOT_AVAILABLE
    }
}

/// Values needed to open a new scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScan {
    pub repository_path: PathBuf,
    pub revision: Revision,
    pub scan_date: DateTime<Utc>,
}

/// Root of one point-in-time snapshot. Deleting it removes everything it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scan {
    pub id: i64,
    pub repository_path: String,
    pub git_commit: String,
    pub short_commit: String,
    pub scan_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_revision_is_eight_chars() {
        let rev = Revision::from_commit("3f1c2ab94d0e55aa10b2c3d4e5f60718293a4b5c\n");
        assert_eq!(rev.short, "3f1c2ab9");
        assert_eq!(rev.commit.len(), 40);
        assert!(rev.is_available());
    }

    #[test]
    fn unavailable_uses_sentinel() {
        let rev = Revision::unavailable();
        assert_eq!(rev.commit, "N/A");
        assert_eq!(rev.short, "N/A");
        assert!(!rev.is_available());
    }
}
