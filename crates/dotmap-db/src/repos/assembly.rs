//! Assembly repository.

use dotmap_core::entities::{Assembly, Stored};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_path, parse_enum};
use crate::store::GraphStore;

fn row_to_assembly(row: &libsql::Row) -> Result<Stored<Assembly>, DatabaseError> {
    Ok(Stored {
        id: row.get::<i64>(0)?,
        scan_id: row.get::<i64>(1)?,
        item: Assembly {
            unique_identifier: row.get::<String>(2)?,
            name: row.get::<String>(3)?,
            kind: parse_enum(&row.get::<String>(4)?)?,
            file_path: get_path(row, 5)?,
            version: get_opt_string(row, 6)?,
        },
    })
}

pub(crate) async fn fetch_assemblies(
    conn: &libsql::Connection,
    scan_id: i64,
) -> Result<Vec<Stored<Assembly>>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, scan_id, unique_identifier, name, kind, file_path, version
             FROM assemblies WHERE scan_id = ?1 ORDER BY file_path",
            [scan_id],
        )
        .await?;
    let mut assemblies = Vec::new();
    while let Some(row) = rows.next().await? {
        assemblies.push(row_to_assembly(&row)?);
    }
    Ok(assemblies)
}

impl GraphStore {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn list_assemblies(
        &self,
        scan_id: i64,
    ) -> Result<Vec<Stored<Assembly>>, DatabaseError> {
        let _gate = self.lock().await;
        fetch_assemblies(self.db().conn(), scan_id).await
    }
}
