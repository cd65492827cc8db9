//! Scan repository: list, get, summarize, delete.

use serde::Serialize;
use tracing::info;

use dotmap_core::entities::Scan;
use dotmap_core::graph::GraphCounts;

use crate::error::DatabaseError;
use crate::helpers::{get_count, parse_datetime};
use crate::store::GraphStore;

const SCAN_COLUMNS: &str =
    "id, repository_path, git_commit, short_commit, scan_date, created_at";

fn row_to_scan(row: &libsql::Row) -> Result<Scan, DatabaseError> {
    Ok(Scan {
        id: row.get::<i64>(0)?,
        repository_path: row.get::<String>(1)?,
        git_commit: row.get::<String>(2)?,
        short_commit: row.get::<String>(3)?,
        scan_date: parse_datetime(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

pub(crate) async fn fetch_scan(conn: &libsql::Connection, id: i64) -> Result<Scan, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SCAN_COLUMNS} FROM scans WHERE id = ?1"), [id])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    row_to_scan(&row)
}

/// Row counts of everything a scan owns.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ScanSummary {
    #[serde(flatten)]
    pub graph: GraphCounts,
    pub events: usize,
}

pub(crate) async fn fetch_summary(
    conn: &libsql::Connection,
    scan_id: i64,
) -> Result<ScanSummary, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT
                (SELECT COUNT(*) FROM solutions WHERE scan_id = ?1),
                (SELECT COUNT(*) FROM projects WHERE scan_id = ?1),
                (SELECT COUNT(*) FROM packages WHERE scan_id = ?1),
                (SELECT COUNT(*) FROM assemblies WHERE scan_id = ?1),
                (SELECT COUNT(*) FROM solution_projects sp
                    JOIN projects p ON p.id = sp.project_id WHERE p.scan_id = ?1),
                (SELECT COUNT(*) FROM project_references r
                    JOIN projects p ON p.id = r.referencing_project_id WHERE p.scan_id = ?1),
                (SELECT COUNT(*) FROM project_package_references r
                    JOIN projects p ON p.id = r.project_id WHERE p.scan_id = ?1),
                (SELECT COUNT(*) FROM project_assembly_references r
                    JOIN projects p ON p.id = r.project_id WHERE p.scan_id = ?1),
                (SELECT COUNT(*) FROM assembly_dependencies d
                    JOIN assemblies a ON a.id = d.referencing_assembly_id WHERE a.scan_id = ?1),
                (SELECT COUNT(*) FROM scan_events WHERE scan_id = ?1)",
            [scan_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(ScanSummary {
        graph: GraphCounts {
            solutions: get_count(&row, 0)?,
            projects: get_count(&row, 1)?,
            packages: get_count(&row, 2)?,
            assemblies: get_count(&row, 3)?,
            solution_projects: get_count(&row, 4)?,
            project_references: get_count(&row, 5)?,
            project_packages: get_count(&row, 6)?,
            project_assemblies: get_count(&row, 7)?,
            assembly_dependencies: get_count(&row, 8)?,
        },
        events: get_count(&row, 9)?,
    })
}

impl GraphStore {
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no scan has this id.
    pub async fn get_scan(&self, id: i64) -> Result<Scan, DatabaseError> {
        let _gate = self.lock().await;
        fetch_scan(self.db().conn(), id).await
    }

    /// Most recent scans first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_scans(&self, limit: u32) -> Result<Vec<Scan>, DatabaseError> {
        let _gate = self.lock().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SCAN_COLUMNS} FROM scans ORDER BY id DESC LIMIT ?1"),
                [i64::from(limit)],
            )
            .await?;
        let mut scans = Vec::new();
        while let Some(row) = rows.next().await? {
            scans.push(row_to_scan(&row)?);
        }
        Ok(scans)
    }

    /// Row counts for one scan. Unknown ids yield all zeros.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn scan_summary(&self, scan_id: i64) -> Result<ScanSummary, DatabaseError> {
        let _gate = self.lock().await;
        fetch_summary(self.db().conn(), scan_id).await
    }

    /// Delete a scan and, through the cascade, everything it owns.
    ///
    /// Returns `false` if no scan had this id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_scan(&self, id: i64) -> Result<bool, DatabaseError> {
        let _gate = self.lock().await;
        let deleted = self
            .db()
            .conn()
            .execute("DELETE FROM scans WHERE id = ?1", [id])
            .await?;
        if deleted > 0 {
            info!(scan_id = id, "scan deleted");
        }
        Ok(deleted > 0)
    }
}
