//! # dotmap-db
//!
//! libSQL persistence for dotmap scans.
//!
//! Stores each scan as a rooted snapshot: solutions, projects, packages,
//! assemblies, and scan events are cascade children of `scans`, and the five
//! edge tables each cascade from exactly one side. A scan is written in one
//! transaction through [`writer::ScanWriter`] and removed with a single
//! `DELETE` through [`store::GraphStore::delete_scan`].
//!
//! Uses the `libsql` crate (C `SQLite` fork) in local mode.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod schema;
pub mod store;
pub mod writer;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Raw database handle: an opened libSQL database and its connection.
pub struct GraphDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl GraphDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Enables foreign keys and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let graph_db = Self { db, conn };
        graph_db.run_migrations().await?;
        Ok(graph_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> GraphDb {
        GraphDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "scans",
            "scan_events",
            "solutions",
            "projects",
            "packages",
            "assemblies",
            "solution_projects",
            "project_references",
            "project_package_references",
            "project_assembly_references",
            "assembly_dependencies",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO projects (scan_id, unique_identifier, name, file_path, guid_source, style)
                 VALUES (999, 'X', 'Orphan', '/x.csproj', 'not_found', 'sdk')",
                (),
            )
            .await;
        assert!(result.is_err(), "insert without parent scan should fail");
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn file_database_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("graph.db");
        let path = path.to_str().unwrap();

        let db = GraphDb::open_local(path).await.unwrap();
        db.conn()
            .execute(
                "INSERT INTO scans (repository_path, scan_date) VALUES ('/repo', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();
        drop(db);

        let db = GraphDb::open_local(path).await.unwrap();
        let mut rows = db.conn().query("SELECT COUNT(*) FROM scans", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
