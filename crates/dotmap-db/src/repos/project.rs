//! Project repository.

use dotmap_core::entities::{Project, Stored};
use dotmap_core::NOT_AVAILABLE;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_path, parse_enum};
use crate::store::GraphStore;

fn row_to_project(row: &libsql::Row) -> Result<Stored<Project>, DatabaseError> {
    Ok(Stored {
        id: row.get::<i64>(0)?,
        scan_id: row.get::<i64>(1)?,
        item: Project {
            unique_identifier: row.get::<String>(2)?,
            native_guid: get_opt_string(row, 3)?,
            name: row.get::<String>(4)?,
            file_path: get_path(row, 5)?,
            guid_source: parse_enum(&row.get::<String>(6)?)?,
            target_framework: get_opt_string(row, 7)?
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            style: parse_enum(&row.get::<String>(8)?)?,
        },
    })
}

pub(crate) async fn fetch_projects(
    conn: &libsql::Connection,
    scan_id: i64,
) -> Result<Vec<Stored<Project>>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, scan_id, unique_identifier, native_guid, name, file_path, guid_source, target_framework, style
             FROM projects WHERE scan_id = ?1 ORDER BY file_path",
            [scan_id],
        )
        .await?;
    let mut projects = Vec::new();
    while let Some(row) = rows.next().await? {
        projects.push(row_to_project(&row)?);
    }
    Ok(projects)
}

impl GraphStore {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn list_projects(&self, scan_id: i64) -> Result<Vec<Stored<Project>>, DatabaseError> {
        let _gate = self.lock().await;
        fetch_projects(self.db().conn(), scan_id).await
    }
}
