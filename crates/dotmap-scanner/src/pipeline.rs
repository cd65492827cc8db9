//! The phases of one scan.
//!
//! [`ScanPipeline::collect`] does all filesystem work synchronously and
//! returns the finished graph; nothing is written until
//! [`ScanPipeline::commit`] stores it in a single transaction. Per-file
//! parses within a phase run in parallel on rayon and never fail the scan.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, warn};

use dotmap_config::ScanConfig;
use dotmap_core::entities::{NewScan, Scan};
use dotmap_core::enums::ScanPhase;
use dotmap_core::graph::ScanGraph;
use dotmap_db::store::GraphStore;

use crate::discovery::PathDiscovery;
use crate::error::{ParseError, ScanError, ScanWarning};
use crate::graph::{BuilderStats, DependencyGraphBuilder};
use crate::progress::PhaseTracker;
use crate::project::{ParsedProject, ProjectParser};
use crate::solution::{GuidMap, ParsedSolution, SolutionParser};
use crate::vcs::read_revision;

/// Everything a scan found, ready to commit.
#[derive(Debug, Clone)]
pub struct CollectedScan {
    pub new_scan: NewScan,
    pub graph: ScanGraph,
    pub stats: BuilderStats,
    pub warnings: Vec<ScanWarning>,
}

#[derive(Debug, Clone)]
pub struct ScanPipeline {
    config: ScanConfig,
}

impl ScanPipeline {
    #[must_use]
    pub const fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Run every phase up to and including graph construction.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::RepositoryNotFound` if `root` is not a directory,
    /// or `ScanError::Cancelled` if `cancel` is set between phases.
    pub fn collect(
        &self,
        root: &Path,
        tracker: &mut PhaseTracker,
        cancel: &AtomicBool,
    ) -> Result<CollectedScan, ScanError> {
        let root = PathDiscovery::resolve_root(root)?;
        let pool = self.thread_pool();
        let mut warnings = Vec::new();

        checkpoint(cancel)?;
        tracker.enter(ScanPhase::Vcs, "reading revision");
        let revision = read_revision(&root);
        if !revision.is_available() {
            warn!(root = %root.display(), "revision unavailable");
        }

        checkpoint(cancel)?;
        tracker.enter(ScanPhase::Discovery, format!("walking {}", root.display()));
        let discovered = PathDiscovery::from_config(&self.config).discover(&root)?;
        warnings.extend(discovered.warnings);
        tracker.report(
            format!(
                "found {} solutions and {} projects",
                discovered.solutions.len(),
                discovered.projects.len()
            ),
            15,
        );

        checkpoint(cancel)?;
        tracker.enter(
            ScanPhase::Solutions,
            format!("parsing {} solutions", discovered.solutions.len()),
        );
        let solution_parser = SolutionParser::from_config(&self.config);
        let solutions: Vec<ParsedSolution> = keep_parsed(
            ScanPhase::Solutions,
            parallel_map(pool.as_ref(), &discovered.solutions, |p| {
                solution_parser.parse_file(p)
            }),
            &mut warnings,
        );
        let guid_map = GuidMap::from_solutions(&solutions);
        debug!(guids = guid_map.len(), "solution guid map built");
        tracker.report(format!("parsed {} solutions", solutions.len()), 30);

        checkpoint(cancel)?;
        tracker.enter(
            ScanPhase::Projects,
            format!("parsing {} projects", discovered.projects.len()),
        );
        let project_parser = ProjectParser::new(&guid_map);
        let mut projects: Vec<ParsedProject> = keep_parsed(
            ScanPhase::Projects,
            parallel_map(pool.as_ref(), &discovered.projects, |p| {
                project_parser.parse_file(p)
            }),
            &mut warnings,
        );
        for project in &mut projects {
            warnings.append(&mut project.warnings);
        }
        tracker.report(format!("parsed {} projects", projects.len()), 60);

        let mut builder = DependencyGraphBuilder::new();
        builder.add_solutions(&solutions);
        let kept = builder.add_projects(&projects);

        checkpoint(cancel)?;
        tracker.enter(
            ScanPhase::Assemblies,
            format!("extracting assemblies from {} projects", kept.len()),
        );
        builder.add_assemblies(&kept);

        checkpoint(cancel)?;
        tracker.enter(ScanPhase::Graph, "linking dependencies");
        builder.add_solution_edges(&solutions);
        builder.add_project_edges(&kept);
        let built = builder.finish();
        warnings.extend(built.warnings);

        for warning in &warnings {
            tracker.warn(warning);
        }
        checkpoint(cancel)?;

        Ok(CollectedScan {
            new_scan: NewScan {
                repository_path: root,
                revision,
                scan_date: Utc::now(),
            },
            graph: built.graph,
            stats: built.stats,
            warnings,
        })
    }

    /// Store a collected scan with the tracker's event log.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::Database` if the transaction fails; nothing is
    /// stored in that case.
    pub async fn commit(
        store: &GraphStore,
        collected: &CollectedScan,
        tracker: &mut PhaseTracker,
    ) -> Result<Scan, ScanError> {
        tracker.enter(
            ScanPhase::Database,
            format!("writing {} rows", collected.graph.counts().total()),
        );
        let scan = store
            .commit_graph(&collected.new_scan, &collected.graph, tracker.events())
            .await?;
        Ok(scan)
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        match self.config.parse_threads {
            0 => None,
            n => rayon::ThreadPoolBuilder::new().num_threads(n).build().ok(),
        }
    }
}

fn checkpoint(cancel: &AtomicBool) -> Result<(), ScanError> {
    if cancel.load(Ordering::Relaxed) {
        Err(ScanError::Cancelled)
    } else {
        Ok(())
    }
}

/// Map `items` in parallel, preserving order.
fn parallel_map<T, R, F>(pool: Option<&rayon::ThreadPool>, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match pool {
        Some(pool) => pool.install(|| items.par_iter().map(&f).collect()),
        None => items.par_iter().map(&f).collect(),
    }
}

fn keep_parsed<T>(
    phase: ScanPhase,
    results: Vec<Result<T, ParseError>>,
    warnings: &mut Vec<ScanWarning>,
) -> Vec<T> {
    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(error = %err, "manifest skipped");
                warnings.push(ScanWarning::from_parse(phase, &err));
                None
            }
        })
        .collect()
}
