//! Graph store: the single entry point for reading and writing scans.
//!
//! `GraphStore` wraps `GraphDb` and serializes access to its connection with
//! an async gate. A [`ScanWriter`](crate::writer::ScanWriter) holds the gate
//! for its whole transaction, so readers never observe a partially written
//! scan. Repository queries live in `impl GraphStore` blocks under
//! [`crate::repos`].

use tokio::sync::{Mutex, MutexGuard};

use crate::GraphDb;
use crate::error::DatabaseError;

/// Shared handle to the graph database. Wrap in `Arc` to share across tasks.
pub struct GraphStore {
    db: GraphDb,
    gate: Mutex<()>,
}

impl GraphStore {
    /// Open (or create) a local store.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = GraphDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `GraphDb`.
    #[must_use]
    pub fn from_db(db: GraphDb) -> Self {
        Self {
            db,
            gate: Mutex::new(()),
        }
    }

    /// Access the raw database handle.
    ///
    /// Bypasses the gate; intended for tests and schema inspection.
    #[must_use]
    pub const fn db(&self) -> &GraphDb {
        &self.db
    }

    /// Wait for exclusive use of the connection.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}
