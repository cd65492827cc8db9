//! Foreign-key inspection.
//!
//! Reads the delete policy of each table back from `SQLite` so the cascade
//! layout can be checked and displayed without parsing the migration.

use std::fmt;

use serde::Serialize;

use dotmap_core::enums::EdgeKind;

use crate::error::DatabaseError;
use crate::store::GraphStore;

/// Node tables, each a direct cascade child of `scans`.
pub const NODE_TABLES: [&str; 5] = ["scan_events", "solutions", "projects", "packages", "assemblies"];

/// `ON DELETE` behavior of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteAction {
    Cascade,
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
}

impl DeleteAction {
    fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s.to_ascii_uppercase().as_str() {
            "CASCADE" => Ok(Self::Cascade),
            "NO ACTION" => Ok(Self::NoAction),
            "RESTRICT" => Ok(Self::Restrict),
            "SET NULL" => Ok(Self::SetNull),
            "SET DEFAULT" => Ok(Self::SetDefault),
            other => Err(DatabaseError::Query(format!("unknown ON DELETE action '{other}'"))),
        }
    }

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

impl fmt::Display for DeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One foreign key as reported by `pragma_foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub references: String,
    pub on_delete: DeleteAction,
}

/// Every table that carries a foreign key, node tables first.
#[must_use]
pub fn graph_tables() -> Vec<&'static str> {
    NODE_TABLES
        .into_iter()
        .chain(EdgeKind::ALL.into_iter().map(EdgeKind::table))
        .collect()
}

impl GraphStore {
    /// Foreign keys declared on `table`, in column order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the pragma query fails or reports an
    /// unknown delete action.
    pub async fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>, DatabaseError> {
        let _gate = self.lock().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                r#"SELECT "from", "table", on_delete FROM pragma_foreign_key_list(?1) ORDER BY seq, id"#,
                [table],
            )
            .await?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(ForeignKey {
                table: table.to_string(),
                column: row.get::<String>(0)?,
                references: row.get::<String>(1)?,
                on_delete: DeleteAction::parse(&row.get::<String>(2)?)?,
            });
        }
        Ok(keys)
    }

    /// Foreign keys of every graph table.
    ///
    /// # Errors
    ///
    /// Same as [`Self::foreign_keys`].
    pub async fn schema_foreign_keys(&self) -> Result<Vec<ForeignKey>, DatabaseError> {
        let mut all = Vec::new();
        for table in graph_tables() {
            all.extend(self.foreign_keys(table).await?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_store;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn node_tables_cascade_from_scans() {
        let store = test_store().await;
        for table in NODE_TABLES {
            let keys = store.foreign_keys(table).await.unwrap();
            assert_eq!(keys.len(), 1, "{table}");
            assert_eq!(keys[0].references, "scans");
            assert_eq!(keys[0].on_delete, DeleteAction::Cascade, "{table}");
        }
    }

    #[tokio::test]
    async fn unknown_table_has_no_keys() {
        let store = test_store().await;
        assert!(store.foreign_keys("nope").await.unwrap().is_empty());
    }

    #[test]
    fn delete_action_parses_pragma_text() {
        assert_eq!(DeleteAction::parse("NO ACTION").unwrap(), DeleteAction::NoAction);
        assert_eq!(DeleteAction::parse("cascade").unwrap(), DeleteAction::Cascade);
        assert!(DeleteAction::parse("EXPLODE").is_err());
    }
}
