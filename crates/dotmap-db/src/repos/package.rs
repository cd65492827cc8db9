//! Package repository.

use dotmap_core::entities::{Package, Stored};

use crate::error::DatabaseError;
use crate::store::GraphStore;

pub(crate) async fn fetch_packages(
    conn: &libsql::Connection,
    scan_id: i64,
) -> Result<Vec<Stored<Package>>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, scan_id, name, version FROM packages WHERE scan_id = ?1 ORDER BY name, version",
            [scan_id],
        )
        .await?;
    let mut packages = Vec::new();
    while let Some(row) = rows.next().await? {
        packages.push(Stored {
            id: row.get::<i64>(0)?,
            scan_id: row.get::<i64>(1)?,
            item: Package::new(row.get::<String>(2)?, row.get::<String>(3)?),
        });
    }
    Ok(packages)
}

impl GraphStore {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_packages(&self, scan_id: i64) -> Result<Vec<Stored<Package>>, DatabaseError> {
        let _gate = self.lock().await;
        fetch_packages(self.db().conn(), scan_id).await
    }
}
