//! A scan becomes visible all at once or not at all.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;

use dotmap_core::entities::{NewScan, Package, Project, Revision};
use dotmap_core::enums::{GuidSource, ProjectStyle};
use dotmap_core::graph::{Edge, ScanGraph};
use dotmap_core::identity::path_identifier;
use dotmap_db::error::DatabaseError;
use dotmap_db::store::GraphStore;

fn new_scan() -> NewScan {
    NewScan {
        repository_path: PathBuf::from("/repo"),
        revision: Revision::from_commit("feedfacecafebeef"),
        scan_date: Utc::now(),
    }
}

fn project(name: &str) -> Project {
    let file_path = PathBuf::from(format!("/repo/{name}.csproj"));
    Project {
        unique_identifier: path_identifier(&file_path),
        native_guid: None,
        name: name.into(),
        file_path,
        guid_source: GuidSource::NotFound,
        target_framework: "net8.0".into(),
        style: ProjectStyle::Sdk,
    }
}

#[tokio::test]
async fn edge_to_unknown_node_rolls_back_whole_scan() {
    let store = GraphStore::open_local(":memory:").await.unwrap();
    let app = project("App");
    let mut graph = ScanGraph {
        projects: vec![app.clone()],
        ..ScanGraph::default()
    };
    graph.insert_edge(Edge::ProjectPackage {
        project: app.unique_identifier,
        package: Package::new("Missing", "1.0.0"),
    });

    let err = store.commit_graph(&new_scan(), &graph, &[]).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidState(_)), "{err}");
    assert!(store.list_scans(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_project_identity_rolls_back() {
    let store = GraphStore::open_local(":memory:").await.unwrap();
    let graph = ScanGraph {
        projects: vec![project("App"), project("App")],
        ..ScanGraph::default()
    };

    assert!(store.commit_graph(&new_scan(), &graph, &[]).await.is_err());
    assert!(store.list_scans(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_edges_are_stored_once() {
    let store = GraphStore::open_local(":memory:").await.unwrap();
    let (a, b) = (project("A"), project("B"));
    let graph = ScanGraph {
        projects: vec![a.clone(), b.clone()],
        ..ScanGraph::default()
    };
    let edge = Edge::ProjectReference {
        referencing: a.unique_identifier,
        referenced: b.unique_identifier,
    };

    let mut writer = store.begin_scan(&new_scan()).await.unwrap();
    writer.append_entities(&graph).await.unwrap();
    let inserted = writer.append_edges([&edge, &edge, &edge]).await.unwrap();
    let scan = writer.commit().await.unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(store.scan_summary(scan.id).await.unwrap().graph.project_references, 1);
}

#[tokio::test]
async fn readers_wait_for_open_writer() {
    let store = Arc::new(GraphStore::open_local(":memory:").await.unwrap());

    let mut writer = store.begin_scan(&new_scan()).await.unwrap();
    writer
        .append_projects(&[project("App")])
        .await
        .unwrap();

    let reader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.list_scans(10).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!reader.is_finished(), "reader must not see an open scan");

    let scan = writer.commit().await.unwrap();
    let scans = reader.await.unwrap().unwrap();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].id, scan.id);
    assert_eq!(scans[0].short_commit, "feedface");
}

#[tokio::test]
async fn explicit_rollback_leaves_nothing() {
    let store = GraphStore::open_local(":memory:").await.unwrap();
    let mut writer = store.begin_scan(&new_scan()).await.unwrap();
    writer.append_projects(&[project("App")]).await.unwrap();
    writer.rollback().await.unwrap();

    assert!(store.list_scans(10).await.unwrap().is_empty());
}
