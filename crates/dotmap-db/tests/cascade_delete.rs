//! Cascade layout and whole-scan deletion.
//!
//! - Every junction table has exactly one cascading foreign key
//! - Deleting a scan removes every row it owns, edges included
//! - Other scans are untouched

use std::path::PathBuf;

use chrono::Utc;
use pretty_assertions::assert_eq;

use dotmap_core::entities::{Assembly, NewScan, Package, Project, Revision, Solution};
use dotmap_core::enums::{AssemblyKind, EdgeKind, GuidSource, ProjectStyle};
use dotmap_core::graph::{Edge, ScanGraph};
use dotmap_core::identity::{assembly_identifier, path_identifier};
use dotmap_db::schema::DeleteAction;
use dotmap_db::store::GraphStore;

async fn test_store() -> GraphStore {
    GraphStore::open_local(":memory:").await.unwrap()
}

fn new_scan() -> NewScan {
    NewScan {
        repository_path: PathBuf::from("/repo"),
        revision: Revision::unavailable(),
        scan_date: Utc::now(),
    }
}

fn project(name: &str) -> Project {
    let file_path = PathBuf::from(format!("/repo/{name}/{name}.csproj"));
    Project {
        unique_identifier: path_identifier(&file_path),
        native_guid: None,
        name: name.to_string(),
        file_path,
        guid_source: GuidSource::NotFound,
        target_framework: "N/A".to_string(),
        style: ProjectStyle::Sdk,
    }
}

fn output(project: &Project) -> Assembly {
    Assembly {
        unique_identifier: assembly_identifier(&project.file_path, &project.name),
        name: project.name.clone(),
        kind: AssemblyKind::Library,
        file_path: PathBuf::from(format!("/repo/{0}/bin/{0}.dll", project.name)),
        version: None,
    }
}

/// Three projects in a reference cycle A -> B -> C -> A, so both
/// self-referencing relations point "backwards" at rows of the same scan.
fn cyclic_graph() -> ScanGraph {
    let projects: Vec<Project> = ["A", "B", "C"].into_iter().map(project).collect();
    let outputs: Vec<Assembly> = projects.iter().map(output).collect();
    let sln = PathBuf::from("/repo/All.sln");
    let solution = Solution {
        unique_identifier: path_identifier(&sln),
        native_guid: Some("11111111-2222-3333-4444-555555555555".into()),
        name: "All".into(),
        file_path: sln,
        guid_source: GuidSource::SolutionGuid,
        is_single_project: false,
    };
    let package = Package::new("Newtonsoft.Json", "13.0.3");

    let mut graph = ScanGraph {
        solutions: vec![solution.clone()],
        projects: projects.clone(),
        packages: vec![package.clone()],
        assemblies: outputs.clone(),
        ..ScanGraph::default()
    };
    for i in 0..3 {
        let next = (i + 1) % 3;
        graph.insert_edge(Edge::SolutionProject {
            solution: solution.unique_identifier.clone(),
            project: projects[i].unique_identifier.clone(),
        });
        graph.insert_edge(Edge::ProjectReference {
            referencing: projects[i].unique_identifier.clone(),
            referenced: projects[next].unique_identifier.clone(),
        });
        graph.insert_edge(Edge::ProjectPackage {
            project: projects[i].unique_identifier.clone(),
            package: package.clone(),
        });
        graph.insert_edge(Edge::ProjectAssembly {
            project: projects[i].unique_identifier.clone(),
            assembly: outputs[i].file_path.clone(),
        });
        graph.insert_edge(Edge::AssemblyDependency {
            referencing: outputs[i].file_path.clone(),
            referenced: outputs[next].file_path.clone(),
        });
    }
    graph
}

async fn table_rows(store: &GraphStore, table: &str) -> i64 {
    let mut rows = store
        .db()
        .conn()
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}

// ---------------------------------------------------------------------------
// Schema layout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_junction_has_exactly_one_cascading_key() {
    let store = test_store().await;
    for kind in EdgeKind::ALL {
        let keys = store.foreign_keys(kind.table()).await.unwrap();
        assert_eq!(keys.len(), 2, "{}", kind.table());
        let cascading: Vec<_> = keys
            .iter()
            .filter(|k| k.on_delete == DeleteAction::Cascade)
            .collect();
        let inert: Vec<_> = keys
            .iter()
            .filter(|k| k.on_delete == DeleteAction::NoAction)
            .collect();
        assert_eq!(cascading.len(), 1, "{}", kind.table());
        assert_eq!(inert.len(), 1, "{}", kind.table());
    }
}

#[tokio::test]
async fn cascade_side_is_the_owning_side() {
    let store = test_store().await;
    let expected = [
        ("solution_projects", "project_id", "solution_id"),
        ("project_references", "referencing_project_id", "referenced_project_id"),
        ("project_package_references", "project_id", "package_id"),
        ("project_assembly_references", "project_id", "assembly_id"),
        ("assembly_dependencies", "referencing_assembly_id", "referenced_assembly_id"),
    ];
    for (table, cascade_col, inert_col) in expected {
        let keys = store.foreign_keys(table).await.unwrap();
        let action = |col: &str| keys.iter().find(|k| k.column == col).unwrap().on_delete;
        assert_eq!(action(cascade_col), DeleteAction::Cascade, "{table}.{cascade_col}");
        assert_eq!(action(inert_col), DeleteAction::NoAction, "{table}.{inert_col}");
    }
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deleting_a_scan_removes_everything_it_owns() {
    let store = test_store().await;
    let graph = cyclic_graph();
    let scan = store.commit_graph(&new_scan(), &graph, &[]).await.unwrap();

    let before = store.scan_summary(scan.id).await.unwrap();
    assert_eq!(before.graph, graph.counts());
    assert_eq!(before.graph.project_references, 3);
    assert_eq!(before.graph.assembly_dependencies, 3);

    assert!(store.delete_scan(scan.id).await.unwrap());

    for table in dotmap_db::schema::graph_tables() {
        assert_eq!(table_rows(&store, table).await, 0, "{table} should be empty");
    }
    assert_eq!(table_rows(&store, "scans").await, 0);
}

#[tokio::test]
async fn deleting_one_scan_keeps_the_other() {
    let store = test_store().await;
    let graph = cyclic_graph();
    let keep = store.commit_graph(&new_scan(), &graph, &[]).await.unwrap();
    let removed = store.commit_graph(&new_scan(), &graph, &[]).await.unwrap();

    assert!(store.delete_scan(removed.id).await.unwrap());

    assert_eq!(store.scan_summary(keep.id).await.unwrap().graph, graph.counts());
    assert_eq!(store.scan_summary(removed.id).await.unwrap().graph.total(), 0);
    assert_eq!(store.load_graph(keep.id).await.unwrap().edges, graph.edges);
}

#[tokio::test]
async fn deleting_a_referenced_package_alone_is_blocked() {
    // The non-cascading side protects edges whose owner still exists.
    let store = test_store().await;
    let scan = store.commit_graph(&new_scan(), &cyclic_graph(), &[]).await.unwrap();

    let result = store
        .db()
        .conn()
        .execute(
            "DELETE FROM packages WHERE scan_id = ?1",
            [scan.id],
        )
        .await;
    assert!(result.is_err(), "package still referenced by projects");

    assert!(store.delete_scan(scan.id).await.unwrap());
}
