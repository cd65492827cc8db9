//! Graph database location.

use serde::{Deserialize, Serialize};

fn default_database_path() -> String {
    ".dotmap/graph.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Path of the local libSQL database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl StorageConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
