//! Scan event log.

use dotmap_core::entities::{ScanEvent, Stored};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum};
use crate::store::GraphStore;

impl GraphStore {
    /// Events of one scan in the order they were recorded.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn list_events(&self, scan_id: i64) -> Result<Vec<Stored<ScanEvent>>, DatabaseError> {
        let _gate = self.lock().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, scan_id, occurred_at, phase, level, message
                 FROM scan_events WHERE scan_id = ?1 ORDER BY id",
                [scan_id],
            )
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(Stored {
                id: row.get::<i64>(0)?,
                scan_id: row.get::<i64>(1)?,
                item: ScanEvent {
                    occurred_at: parse_datetime(&row.get::<String>(2)?)?,
                    phase: parse_enum(&row.get::<String>(3)?)?,
                    level: parse_enum(&row.get::<String>(4)?)?,
                    message: row.get::<String>(5)?,
                },
            });
        }
        Ok(events)
    }
}
