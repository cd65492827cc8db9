//! In-memory build graph for one scan.
//!
//! Edges reference their endpoints by natural key: unique identifier for
//! solutions and projects, `(name, version)` for packages, file path for
//! assemblies. The store translates these keys to row ids when persisting.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::entities::{Assembly, Package, Project, Solution};
use crate::enums::EdgeKind;

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A directed relation between two nodes of the same scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edge {
    SolutionProject {
        solution: String,
        project: String,
    },
    ProjectReference {
        referencing: String,
        referenced: String,
    },
    ProjectPackage {
        project: String,
        package: Package,
    },
    ProjectAssembly {
        project: String,
        assembly: PathBuf,
    },
    AssemblyDependency {
        referencing: PathBuf,
        referenced: PathBuf,
    },
}

impl Edge {
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        match self {
            Self::SolutionProject { .. } => EdgeKind::SolutionProject,
            Self::ProjectReference { .. } => EdgeKind::ProjectReference,
            Self::ProjectPackage { .. } => EdgeKind::ProjectPackage,
            Self::ProjectAssembly { .. } => EdgeKind::ProjectAssembly,
            Self::AssemblyDependency { .. } => EdgeKind::AssemblyDependency,
        }
    }

    /// Whether both ends of a self-referencing relation are the same node.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        match self {
            Self::ProjectReference {
                referencing,
                referenced,
            } => referencing == referenced,
            Self::AssemblyDependency {
                referencing,
                referenced,
            } => referencing == referenced,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// ScanGraph
// ---------------------------------------------------------------------------

/// All nodes and edges produced by one scan, ready to be committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanGraph {
    pub solutions: Vec<Solution>,
    pub projects: Vec<Project>,
    pub packages: Vec<Package>,
    pub assemblies: Vec<Assembly>,
    pub edges: BTreeSet<Edge>,
}

impl ScanGraph {
    /// Add an edge. Self-loops and duplicates are ignored; returns whether it was new.
    pub fn insert_edge(&mut self, edge: Edge) -> bool {
        if edge.is_self_loop() {
            return false;
        }
        self.edges.insert(edge)
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.kind() == kind)
    }

    #[must_use]
    pub fn counts(&self) -> GraphCounts {
        let edges = |kind| self.edges_of(kind).count();
        GraphCounts {
            solutions: self.solutions.len(),
            projects: self.projects.len(),
            packages: self.packages.len(),
            assemblies: self.assemblies.len(),
            solution_projects: edges(EdgeKind::SolutionProject),
            project_references: edges(EdgeKind::ProjectReference),
            project_packages: edges(EdgeKind::ProjectPackage),
            project_assemblies: edges(EdgeKind::ProjectAssembly),
            assembly_dependencies: edges(EdgeKind::AssemblyDependency),
        }
    }
}

/// Row counts per node and edge table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphCounts {
    pub solutions: usize,
    pub projects: usize,
    pub packages: usize,
    pub assemblies: usize,
    pub solution_projects: usize,
    pub project_references: usize,
    pub project_packages: usize,
    pub project_assemblies: usize,
    pub assembly_dependencies: usize,
}

impl GraphCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.solutions
            + self.projects
            + self.packages
            + self.assemblies
            + self.solution_projects
            + self.project_references
            + self.project_packages
            + self.project_assemblies
            + self.assembly_dependencies
    }
}
