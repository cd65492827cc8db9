//! Shared fixtures for dotmap-db unit tests.

pub(crate) mod helpers {
    use std::path::PathBuf;

    use chrono::Utc;
    use dotmap_core::entities::{Assembly, NewScan, Package, Project, Revision, Solution};
    use dotmap_core::enums::{AssemblyKind, GuidSource, ProjectStyle};
    use dotmap_core::graph::{Edge, ScanGraph};
    use dotmap_core::identity::{assembly_identifier, path_identifier};

    use crate::store::GraphStore;

    /// Create an in-memory store.
    pub async fn test_store() -> GraphStore {
        GraphStore::open_local(":memory:").await.unwrap()
    }

    pub fn new_scan(root: &str) -> NewScan {
        NewScan {
            repository_path: PathBuf::from(root),
            revision: Revision::from_commit("0123456789abcdef0123456789abcdef01234567"),
            scan_date: Utc::now(),
        }
    }

    fn project(path: &str, name: &str, style: ProjectStyle) -> Project {
        let file_path = PathBuf::from(path);
        Project {
            unique_identifier: path_identifier(&file_path),
            native_guid: Some(format!("{:08X}-0000-0000-0000-000000000000", name.len())),
            name: name.to_string(),
            file_path,
            guid_source: GuidSource::ProjectGuidElement,
            target_framework: "net8.0".to_string(),
            style,
        }
    }

    fn output(project: &Project, ext: &str, kind: AssemblyKind) -> Assembly {
        Assembly {
            unique_identifier: assembly_identifier(&project.file_path, &project.name),
            name: project.name.clone(),
            kind,
            file_path: project
                .file_path
                .with_file_name(format!("bin/{}{ext}", project.name)),
            version: None,
        }
    }

    /// One solution, two projects (App -> Lib), one package, two outputs,
    /// and one edge of every kind.
    pub fn sample_graph() -> ScanGraph {
        let app = project("/repo/src/App/App.csproj", "App", ProjectStyle::Sdk);
        let lib = project("/repo/src/Lib/Lib.csproj", "Lib", ProjectStyle::Legacy);
        let solution_path = PathBuf::from("/repo/All.sln");
        let solution = Solution {
            unique_identifier: path_identifier(&solution_path),
            native_guid: None,
            name: "All".to_string(),
            file_path: solution_path,
            guid_source: GuidSource::NotFound,
            is_single_project: false,
        };
        let package = Package::new("Serilog", "3.1.1");
        let app_out = output(&app, ".exe", AssemblyKind::Executable);
        let lib_out = output(&lib, ".dll", AssemblyKind::Library);

        let mut graph = ScanGraph {
            solutions: vec![solution.clone()],
            projects: vec![app.clone(), lib.clone()],
            packages: vec![package.clone()],
            assemblies: vec![app_out.clone(), lib_out.clone()],
            ..ScanGraph::default()
        };
        for p in [&app, &lib] {
            graph.insert_edge(Edge::SolutionProject {
                solution: solution.unique_identifier.clone(),
                project: p.unique_identifier.clone(),
            });
        }
        graph.insert_edge(Edge::ProjectReference {
            referencing: app.unique_identifier.clone(),
            referenced: lib.unique_identifier.clone(),
        });
        graph.insert_edge(Edge::ProjectPackage {
            project: lib.unique_identifier.clone(),
            package,
        });
        graph.insert_edge(Edge::ProjectAssembly {
            project: app.unique_identifier.clone(),
            assembly: app_out.file_path.clone(),
        });
        graph.insert_edge(Edge::ProjectAssembly {
            project: lib.unique_identifier,
            assembly: lib_out.file_path.clone(),
        });
        graph.insert_edge(Edge::AssemblyDependency {
            referencing: app_out.file_path,
            referenced: lib_out.file_path,
        });
        graph
    }
}
