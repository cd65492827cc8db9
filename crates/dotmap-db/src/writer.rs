//! Transactional scan writer.
//!
//! A scan is persisted in four steps, all inside one transaction:
//! 1. `begin_scan` inserts the scan row
//! 2. `append_*` insert nodes and remember their row ids by natural key
//! 3. `append_edges` translates natural keys to row ids and fills the
//!    junction tables (`INSERT OR IGNORE`, so repeated edges are stored once)
//! 4. `commit` makes the whole snapshot visible at once
//!
//! Nothing is visible to other readers until `commit`. On any error callers
//! must call `rollback`; [`GraphStore::commit_graph`] does this for them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::MutexGuard;
use tracing::{debug, warn};

use dotmap_core::entities::{Assembly, NewScan, Package, Project, Scan, ScanEvent, Solution};
use dotmap_core::graph::{Edge, ScanGraph};

use crate::error::DatabaseError;
use crate::helpers::path_text;
use crate::repos::scan::fetch_scan;
use crate::store::GraphStore;

/// Open write transaction for one scan. Holds the store gate until dropped.
pub struct ScanWriter<'a> {
    _gate: MutexGuard<'a, ()>,
    tx: libsql::Transaction,
    scan_id: i64,
    solutions: HashMap<String, i64>,
    projects: HashMap<String, i64>,
    packages: HashMap<Package, i64>,
    assemblies: HashMap<PathBuf, i64>,
}

impl GraphStore {
    /// Start a transaction and insert the scan row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction cannot be opened or the
    /// insert fails.
    pub async fn begin_scan(&self, scan: &NewScan) -> Result<ScanWriter<'_>, DatabaseError> {
        let gate = self.lock().await;
        let tx = self.db().conn().transaction().await?;

        let mut rows = tx
            .query(
                "INSERT INTO scans (repository_path, git_commit, short_commit, scan_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
                libsql::params![
                    path_text(&scan.repository_path),
                    scan.revision.commit.as_str(),
                    scan.revision.short.as_str(),
                    scan.scan_date.to_rfc3339(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let scan_id = row.get::<i64>(0)?;
        drop(rows);
        debug!(scan_id, repository = %scan.repository_path.display(), "scan started");

        Ok(ScanWriter {
            _gate: gate,
            tx,
            scan_id,
            solutions: HashMap::new(),
            projects: HashMap::new(),
            packages: HashMap::new(),
            assemblies: HashMap::new(),
        })
    }

    /// Persist a complete graph and its events as one scan.
    ///
    /// Either the whole scan is committed or nothing is.
    ///
    /// # Errors
    ///
    /// Returns the first `DatabaseError` encountered; the transaction is
    /// rolled back before returning.
    pub async fn commit_graph(
        &self,
        scan: &NewScan,
        graph: &ScanGraph,
        events: &[ScanEvent],
    ) -> Result<Scan, DatabaseError> {
        let mut writer = self.begin_scan(scan).await?;
        let filled = async {
            writer.append_entities(graph).await?;
            writer.append_edges(&graph.edges).await?;
            writer.append_events(events).await
        }
        .await;

        match filled {
            Ok(()) => writer.commit().await,
            Err(e) => {
                if let Err(rollback) = writer.rollback().await {
                    warn!(error = %rollback, "rollback after failed scan write");
                }
                Err(e)
            }
        }
    }
}

impl ScanWriter<'_> {
    #[must_use]
    pub const fn scan_id(&self) -> i64 {
        self.scan_id
    }

    /// Insert every node of the graph. Edges are appended separately.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails (including unique violations).
    pub async fn append_entities(&mut self, graph: &ScanGraph) -> Result<(), DatabaseError> {
        self.append_solutions(&graph.solutions).await?;
        self.append_projects(&graph.projects).await?;
        self.append_packages(&graph.packages).await?;
        self.append_assemblies(&graph.assemblies).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn append_solutions(&mut self, solutions: &[Solution]) -> Result<(), DatabaseError> {
        for solution in solutions {
            let id = self
                .insert_returning_id(
                    "INSERT INTO solutions (scan_id, unique_identifier, native_guid, name, file_path, guid_source, is_single_project)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
                    libsql::params![
                        self.scan_id,
                        solution.unique_identifier.as_str(),
                        solution.native_guid.as_deref(),
                        solution.name.as_str(),
                        path_text(&solution.file_path),
                        solution.guid_source.as_str(),
                        i64::from(solution.is_single_project)
                    ],
                )
                .await?;
            self.solutions.insert(solution.unique_identifier.clone(), id);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn append_projects(&mut self, projects: &[Project]) -> Result<(), DatabaseError> {
        for project in projects {
            let id = self
                .insert_returning_id(
                    "INSERT INTO projects (scan_id, unique_identifier, native_guid, name, file_path, guid_source, target_framework, style)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id",
                    libsql::params![
                        self.scan_id,
                        project.unique_identifier.as_str(),
                        project.native_guid.as_deref(),
                        project.name.as_str(),
                        path_text(&project.file_path),
                        project.guid_source.as_str(),
                        project.target_framework.as_str(),
                        project.style.as_str()
                    ],
                )
                .await?;
            self.projects.insert(project.unique_identifier.clone(), id);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn append_packages(&mut self, packages: &[Package]) -> Result<(), DatabaseError> {
        for package in packages {
            let id = self
                .insert_returning_id(
                    "INSERT INTO packages (scan_id, name, version) VALUES (?1, ?2, ?3) RETURNING id",
                    libsql::params![self.scan_id, package.name.as_str(), package.version.as_str()],
                )
                .await?;
            self.packages.insert(package.clone(), id);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn append_assemblies(&mut self, assemblies: &[Assembly]) -> Result<(), DatabaseError> {
        for assembly in assemblies {
            let id = self
                .insert_returning_id(
                    "INSERT INTO assemblies (scan_id, unique_identifier, name, kind, file_path, version)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
                    libsql::params![
                        self.scan_id,
                        assembly.unique_identifier.as_str(),
                        assembly.name.as_str(),
                        assembly.kind.as_str(),
                        path_text(&assembly.file_path),
                        assembly.version.as_deref()
                    ],
                )
                .await?;
            self.assemblies.insert(assembly.file_path.clone(), id);
        }
        Ok(())
    }

    /// Insert edges between nodes already appended to this scan.
    ///
    /// Returns the number of rows actually inserted; repeated pairs count once.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if an endpoint was never appended.
    pub async fn append_edges<'e>(
        &mut self,
        edges: impl IntoIterator<Item = &'e Edge>,
    ) -> Result<usize, DatabaseError> {
        let mut inserted = 0usize;
        for edge in edges {
            let (source, target) = self.resolve(edge)?;
            let (from_col, to_col) = edge_columns(edge);
            let sql = format!(
                "INSERT OR IGNORE INTO {} ({from_col}, {to_col}) VALUES (?1, ?2)",
                edge.kind().table()
            );
            let changed = self.tx.execute(&sql, libsql::params![source, target]).await?;
            if changed > 0 {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Append audit log lines for this scan.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an insert fails.
    pub async fn append_events(&mut self, events: &[ScanEvent]) -> Result<(), DatabaseError> {
        for event in events {
            self.tx
                .execute(
                    "INSERT INTO scan_events (scan_id, occurred_at, phase, level, message)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        self.scan_id,
                        event.occurred_at.to_rfc3339(),
                        event.phase.as_str(),
                        event.level.as_str(),
                        event.message.as_str()
                    ],
                )
                .await?;
        }
        Ok(())
    }

    /// Commit the transaction and return the stored scan row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read-back or the commit fails.
    pub async fn commit(self) -> Result<Scan, DatabaseError> {
        let scan = fetch_scan(&self.tx, self.scan_id).await?;
        self.tx.commit().await?;
        debug!(scan_id = scan.id, "scan committed");
        Ok(scan)
    }

    /// Discard everything written through this writer, including the scan row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the rollback fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        debug!(scan_id = self.scan_id, "scan rolled back");
        Ok(())
    }

    async fn insert_returning_id(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<i64, DatabaseError> {
        let mut rows = self.tx.query(sql, params).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    fn resolve(&self, edge: &Edge) -> Result<(i64, i64), DatabaseError> {
        match edge {
            Edge::SolutionProject { solution, project } => Ok((
                lookup(&self.solutions, solution, "solution")?,
                lookup(&self.projects, project, "project")?,
            )),
            Edge::ProjectReference {
                referencing,
                referenced,
            } => Ok((
                lookup(&self.projects, referencing, "project")?,
                lookup(&self.projects, referenced, "project")?,
            )),
            Edge::ProjectPackage { project, package } => Ok((
                lookup(&self.projects, project, "project")?,
                lookup(&self.packages, package, "package")?,
            )),
            Edge::ProjectAssembly { project, assembly } => Ok((
                lookup(&self.projects, project, "project")?,
                lookup_path(&self.assemblies, assembly)?,
            )),
            Edge::AssemblyDependency {
                referencing,
                referenced,
            } => Ok((
                lookup_path(&self.assemblies, referencing)?,
                lookup_path(&self.assemblies, referenced)?,
            )),
        }
    }
}

/// Source and target columns of the junction table.
const fn edge_columns(edge: &Edge) -> (&'static str, &'static str) {
    match edge {
        Edge::SolutionProject { .. } => ("solution_id", "project_id"),
        Edge::ProjectReference { .. } => ("referencing_project_id", "referenced_project_id"),
        Edge::ProjectPackage { .. } => ("project_id", "package_id"),
        Edge::ProjectAssembly { .. } => ("project_id", "assembly_id"),
        Edge::AssemblyDependency { .. } => ("referencing_assembly_id", "referenced_assembly_id"),
    }
}

fn lookup<K, Q>(ids: &HashMap<K, i64>, key: &Q, what: &str) -> Result<i64, DatabaseError>
where
    K: std::borrow::Borrow<Q> + std::hash::Hash + Eq,
    Q: std::hash::Hash + Eq + std::fmt::Debug + ?Sized,
{
    ids.get(key)
        .copied()
        .ok_or_else(|| DatabaseError::InvalidState(format!("edge references unknown {what} {key:?}")))
}

fn lookup_path(ids: &HashMap<PathBuf, i64>, path: &Path) -> Result<i64, DatabaseError> {
    lookup(ids, path, "assembly")
}
