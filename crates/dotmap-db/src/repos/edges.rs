//! Edge queries and full-graph load.
//!
//! Junction rows are joined back to their endpoints so edges come out keyed
//! by the same natural keys the scanner produced them with.

use std::collections::BTreeSet;
use std::path::PathBuf;

use dotmap_core::entities::{Package, Stored};
use dotmap_core::graph::{Edge, ScanGraph};

use crate::error::DatabaseError;
use crate::repos::assembly::fetch_assemblies;
use crate::repos::package::fetch_packages;
use crate::repos::project::fetch_projects;
use crate::repos::scan::fetch_scan;
use crate::repos::solution::fetch_solutions;
use crate::store::GraphStore;

const SOLUTION_PROJECTS: &str = "SELECT s.unique_identifier, p.unique_identifier
     FROM solution_projects sp
     JOIN solutions s ON s.id = sp.solution_id
     JOIN projects p ON p.id = sp.project_id
     WHERE p.scan_id = ?1";

const PROJECT_REFERENCES: &str = "SELECT a.unique_identifier, b.unique_identifier
     FROM project_references r
     JOIN projects a ON a.id = r.referencing_project_id
     JOIN projects b ON b.id = r.referenced_project_id
     WHERE a.scan_id = ?1";

const PROJECT_PACKAGES: &str = "SELECT p.unique_identifier, k.name, k.version
     FROM project_package_references r
     JOIN projects p ON p.id = r.project_id
     JOIN packages k ON k.id = r.package_id
     WHERE p.scan_id = ?1";

const PROJECT_ASSEMBLIES: &str = "SELECT p.unique_identifier, a.file_path
     FROM project_assembly_references r
     JOIN projects p ON p.id = r.project_id
     JOIN assemblies a ON a.id = r.assembly_id
     WHERE p.scan_id = ?1";

const ASSEMBLY_DEPENDENCIES: &str = "SELECT a.file_path, b.file_path
     FROM assembly_dependencies d
     JOIN assemblies a ON a.id = d.referencing_assembly_id
     JOIN assemblies b ON b.id = d.referenced_assembly_id
     WHERE a.scan_id = ?1";

pub(crate) async fn fetch_edges(
    conn: &libsql::Connection,
    scan_id: i64,
) -> Result<BTreeSet<Edge>, DatabaseError> {
    let mut edges = BTreeSet::new();

    let mut rows = conn.query(SOLUTION_PROJECTS, [scan_id]).await?;
    while let Some(row) = rows.next().await? {
        edges.insert(Edge::SolutionProject {
            solution: row.get::<String>(0)?,
            project: row.get::<String>(1)?,
        });
    }

    let mut rows = conn.query(PROJECT_REFERENCES, [scan_id]).await?;
    while let Some(row) = rows.next().await? {
        edges.insert(Edge::ProjectReference {
            referencing: row.get::<String>(0)?,
            referenced: row.get::<String>(1)?,
        });
    }

    let mut rows = conn.query(PROJECT_PACKAGES, [scan_id]).await?;
    while let Some(row) = rows.next().await? {
        edges.insert(Edge::ProjectPackage {
            project: row.get::<String>(0)?,
            package: Package::new(row.get::<String>(1)?, row.get::<String>(2)?),
        });
    }

    let mut rows = conn.query(PROJECT_ASSEMBLIES, [scan_id]).await?;
    while let Some(row) = rows.next().await? {
        edges.insert(Edge::ProjectAssembly {
            project: row.get::<String>(0)?,
            assembly: PathBuf::from(row.get::<String>(1)?),
        });
    }

    let mut rows = conn.query(ASSEMBLY_DEPENDENCIES, [scan_id]).await?;
    while let Some(row) = rows.next().await? {
        edges.insert(Edge::AssemblyDependency {
            referencing: PathBuf::from(row.get::<String>(0)?),
            referenced: PathBuf::from(row.get::<String>(1)?),
        });
    }

    Ok(edges)
}

fn items<T>(stored: Vec<Stored<T>>) -> Vec<T> {
    stored.into_iter().map(|s| s.item).collect()
}

impl GraphStore {
    /// All edges of one scan.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_edges(&self, scan_id: i64) -> Result<BTreeSet<Edge>, DatabaseError> {
        let _gate = self.lock().await;
        fetch_edges(self.db().conn(), scan_id).await
    }

    /// Rebuild the in-memory graph of a stored scan.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the scan does not exist, or any
    /// query error.
    pub async fn load_graph(&self, scan_id: i64) -> Result<ScanGraph, DatabaseError> {
        let _gate = self.lock().await;
        let conn = self.db().conn();
        fetch_scan(conn, scan_id).await?;

        Ok(ScanGraph {
            solutions: items(fetch_solutions(conn, scan_id).await?),
            projects: items(fetch_projects(conn, scan_id).await?),
            packages: items(fetch_packages(conn, scan_id).await?),
            assemblies: items(fetch_assemblies(conn, scan_id).await?),
            edges: fetch_edges(conn, scan_id).await?,
        })
    }
}
