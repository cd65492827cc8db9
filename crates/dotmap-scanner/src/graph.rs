//! Dependency graph construction.
//!
//! The builder takes every parsed solution and project of a scan and
//! produces the node lists plus the edge set. Nodes are keyed by their
//! case-insensitive path key; when two inputs hash to the same identifier
//! (or share a key) the first one wins and the rest are reported.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use dotmap_core::entities::{Assembly, Package};
use dotmap_core::enums::ScanPhase;
use dotmap_core::graph::{Edge, ScanGraph};
use dotmap_core::identity::path_key;

use crate::assembly::AssemblyExtractor;
use crate::error::ScanWarning;
use crate::project::ParsedProject;
use crate::solution::ParsedSolution;

/// Reference resolution and identity statistics for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuilderStats {
    pub declared_project_references: usize,
    pub resolved_project_references: usize,
    /// References whose target is not a project of this scan.
    pub dropped_project_references: usize,
    pub collisions: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BuiltGraph {
    pub graph: ScanGraph,
    pub stats: BuilderStats,
    pub warnings: Vec<ScanWarning>,
}

/// Identifiers already handed out, keyed both ways.
#[derive(Default)]
struct IdentityTable {
    by_token: HashMap<String, String>,
    by_key: HashMap<String, String>,
}

impl IdentityTable {
    /// Register `token` for `key`. Fails if either was already taken.
    fn claim(&mut self, token: &str, key: &str) -> bool {
        if self.by_key.contains_key(key) {
            return false;
        }
        match self.by_token.entry(token.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(key.to_string());
                self.by_key.insert(key.to_string(), token.to_string());
                true
            }
        }
    }

    fn token(&self, path: &Path) -> Option<&str> {
        self.by_key.get(&path_key(path)).map(String::as_str)
    }
}

#[derive(Default)]
pub struct DependencyGraphBuilder {
    graph: ScanGraph,
    stats: BuilderStats,
    warnings: Vec<ScanWarning>,
    solution_ids: IdentityTable,
    project_ids: IdentityTable,
    /// Path key to the file path of the stored assembly.
    assembly_paths: HashMap<String, PathBuf>,
    /// Project identifier to the path of its output assembly.
    outputs: HashMap<String, PathBuf>,
    packages: BTreeSet<Package>,
}

impl DependencyGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of one scan.
    #[must_use]
    pub fn build(solutions: &[ParsedSolution], projects: &[ParsedProject]) -> BuiltGraph {
        let mut builder = Self::new();
        builder.add_solutions(solutions);
        let kept = builder.add_projects(projects);
        builder.add_assemblies(&kept);
        builder.add_solution_edges(solutions);
        builder.add_project_edges(&kept);
        builder.finish()
    }

    pub fn add_solutions(&mut self, solutions: &[ParsedSolution]) {
        for parsed in solutions {
            let solution = &parsed.solution;
            let key = path_key(&solution.file_path);
            if self.solution_ids.claim(&solution.unique_identifier, &key) {
                self.graph.solutions.push(solution.clone());
            } else {
                self.collision(ScanPhase::Solutions, &solution.file_path);
            }
        }
    }

    /// Add project nodes and packages; returns the projects that were kept.
    pub fn add_projects<'p>(&mut self, projects: &'p [ParsedProject]) -> Vec<&'p ParsedProject> {
        let mut kept = Vec::with_capacity(projects.len());
        for parsed in projects {
            let project = &parsed.project;
            let key = path_key(&project.file_path);
            if !self.project_ids.claim(&project.unique_identifier, &key) {
                self.collision(ScanPhase::Projects, &project.file_path);
                continue;
            }
            self.graph.projects.push(project.clone());
            self.packages.extend(parsed.packages.iter().cloned());
            kept.push(parsed);
        }
        kept
    }

    /// Output assemblies first so that hint paths pointing at a project's
    /// output resolve to that output.
    pub fn add_assemblies(&mut self, projects: &[&ParsedProject]) {
        for parsed in projects {
            match AssemblyExtractor::output(parsed) {
                Ok(assembly) => {
                    if let Some(path) = self.add_assembly(assembly) {
                        let project = parsed.project.unique_identifier.clone();
                        self.outputs.insert(project.clone(), path.clone());
                        self.graph.insert_edge(Edge::ProjectAssembly {
                            project,
                            assembly: path,
                        });
                    }
                }
                Err(warning) => {
                    warn!(%warning, "assembly skipped");
                    self.warnings.push(warning);
                }
            }
        }
        for parsed in projects {
            for assembly in AssemblyExtractor::references(parsed) {
                if let Some(path) = self.add_assembly(assembly) {
                    self.graph.insert_edge(Edge::ProjectAssembly {
                        project: parsed.project.unique_identifier.clone(),
                        assembly: path,
                    });
                }
            }
        }
    }

    /// Add an assembly unless one with the same path exists. Returns the
    /// stored path either way, or `None` for a conflicting build output.
    fn add_assembly(&mut self, assembly: Assembly) -> Option<PathBuf> {
        let key = path_key(&assembly.file_path);
        if let Some(existing) = self.assembly_paths.get(&key).cloned() {
            if assembly.kind.is_build_output() {
                // Two projects writing the same file.
                self.collision(ScanPhase::Assemblies, &assembly.file_path);
                return None;
            }
            return Some(existing);
        }
        let path = assembly.file_path.clone();
        self.assembly_paths.insert(key, path.clone());
        self.graph.assemblies.push(assembly);
        Some(path)
    }

    pub fn add_solution_edges(&mut self, solutions: &[ParsedSolution]) {
        for parsed in solutions {
            let solution = &parsed.solution;
            if self.solution_ids.token(&solution.file_path) != Some(solution.unique_identifier.as_str())
            {
                continue;
            }
            for entry in parsed.existing_entries() {
                let Some(project) = self.project_ids.token(&entry.absolute_path) else {
                    debug!(
                        solution = %solution.file_path.display(),
                        project = %entry.absolute_path.display(),
                        "solution entry is not a discovered project"
                    );
                    continue;
                };
                let edge = Edge::SolutionProject {
                    solution: solution.unique_identifier.clone(),
                    project: project.to_string(),
                };
                self.graph.insert_edge(edge);
            }
        }
    }

    /// Project, package, and assembly edges. Call after [`Self::add_assemblies`].
    pub fn add_project_edges(&mut self, projects: &[&ParsedProject]) {
        for parsed in projects {
            let project = &parsed.project;
            let id = &project.unique_identifier;
            let output = self.outputs.get(id).cloned();

            for package in &parsed.packages {
                self.graph.insert_edge(Edge::ProjectPackage {
                    project: id.clone(),
                    package: package.clone(),
                });
            }

            for reference in &parsed.project_references {
                self.stats.declared_project_references += 1;
                let Some(target) = self.project_ids.token(&reference.resolved).map(String::from)
                else {
                    self.stats.dropped_project_references += 1;
                    debug!(
                        project = %project.file_path.display(),
                        target = %reference.include,
                        "unresolved project reference dropped"
                    );
                    continue;
                };
                self.stats.resolved_project_references += 1;
                self.graph.insert_edge(Edge::ProjectReference {
                    referencing: id.clone(),
                    referenced: target.clone(),
                });

                if let (Some(from), Some(to)) = (&output, self.outputs.get(&target)) {
                    self.graph.insert_edge(Edge::AssemblyDependency {
                        referencing: from.clone(),
                        referenced: to.clone(),
                    });
                }
            }

            if let Some(from) = &output {
                for assembly in AssemblyExtractor::references(parsed) {
                    if let Some(to) = self.assembly_paths.get(&path_key(&assembly.file_path)) {
                        self.graph.insert_edge(Edge::AssemblyDependency {
                            referencing: from.clone(),
                            referenced: to.clone(),
                        });
                    }
                }
            }
        }
    }

    fn collision(&mut self, phase: ScanPhase, path: &Path) {
        self.stats.collisions += 1;
        warn!(path = %path.display(), "identity collision, entity skipped");
        self.warnings.push(ScanWarning::new(
            phase,
            Some(path.to_path_buf()),
            format!("identity collision for {}; entity skipped", path.display()),
        ));
    }

    #[must_use]
    pub fn finish(mut self) -> BuiltGraph {
        self.graph.packages = self.packages.into_iter().collect();
        let counts = self.graph.counts();
        info!(
            solutions = counts.solutions,
            projects = counts.projects,
            packages = counts.packages,
            assemblies = counts.assemblies,
            edges = self.graph.edges.len(),
            dropped_references = self.stats.dropped_project_references,
            collisions = self.stats.collisions,
            "graph built"
        );
        BuiltGraph {
            graph: self.graph,
            stats: self.stats,
            warnings: self.warnings,
        }
    }
}
