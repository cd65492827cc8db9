use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dotmap_config::DotmapConfig;
use dotmap_db::store::GraphStore;
use dotmap_scanner::ScanRunner;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: DotmapConfig,
    pub store: Arc<GraphStore>,
}

impl AppContext {
    /// Open the graph database named by `--db` or `storage.database_path`,
    /// creating its parent directory if needed.
    pub async fn init(mut config: DotmapConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        if let Some(db) = &flags.db {
            config.storage.database_path.clone_from(db);
        }

        if !config.storage.is_in_memory() {
            if let Some(parent) = Path::new(&config.storage.database_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        tracing::debug!(path = %config.storage.database_path, "opening graph database");
        let store = GraphStore::open_local(&config.storage.database_path)
            .await
            .with_context(|| format!("cannot open {}", config.storage.database_path))?;

        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    #[must_use]
    pub fn runner(&self) -> ScanRunner {
        ScanRunner::new(Arc::clone(&self.store), self.config.scan.clone())
    }
}
