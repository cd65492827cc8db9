//! Solution repository.

use dotmap_core::entities::{Solution, Stored};

use crate::error::DatabaseError;
use crate::helpers::{get_flag, get_opt_string, get_path, parse_enum};
use crate::store::GraphStore;

fn row_to_solution(row: &libsql::Row) -> Result<Stored<Solution>, DatabaseError> {
    Ok(Stored {
        id: row.get::<i64>(0)?,
        scan_id: row.get::<i64>(1)?,
        item: Solution {
            unique_identifier: row.get::<String>(2)?,
            native_guid: get_opt_string(row, 3)?,
            name: row.get::<String>(4)?,
            file_path: get_path(row, 5)?,
            guid_source: parse_enum(&row.get::<String>(6)?)?,
            is_single_project: get_flag(row, 7)?,
        },
    })
}

pub(crate) async fn fetch_solutions(
    conn: &libsql::Connection,
    scan_id: i64,
) -> Result<Vec<Stored<Solution>>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, scan_id, unique_identifier, native_guid, name, file_path, guid_source, is_single_project
             FROM solutions WHERE scan_id = ?1 ORDER BY file_path",
            [scan_id],
        )
        .await?;
    let mut solutions = Vec::new();
    while let Some(row) = rows.next().await? {
        solutions.push(row_to_solution(&row)?);
    }
    Ok(solutions)
}

impl GraphStore {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn list_solutions(&self, scan_id: i64) -> Result<Vec<Stored<Solution>>, DatabaseError> {
        let _gate = self.lock().await;
        fetch_solutions(self.db().conn(), scan_id).await
    }
}
