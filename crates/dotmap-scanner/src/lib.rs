//! # dotmap-scanner
//!
//! Turns a .NET repository on disk into a [`ScanGraph`](dotmap_core::graph::ScanGraph)
//! and stores it as one scan.
//!
//! - [`discovery`]: find solution and project files
//! - [`solution`] / [`project`]: parse manifests
//! - [`assembly`]: derive build outputs and binary references
//! - [`graph`]: link everything into nodes and edges
//! - [`pipeline`] / [`job`]: run the phases, in the background, with progress
//!
//! ```no_run
//! use std::sync::Arc;
//! use dotmap_config::ScanConfig;
//! use dotmap_db::store::GraphStore;
//! use dotmap_scanner::job::ScanRunner;
//! use dotmap_scanner::progress::SilentSink;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(GraphStore::open_local(".dotmap/graph.db").await?);
//! let runner = ScanRunner::new(store, ScanConfig::default());
//! let job = runner.submit("/src/contoso", Arc::new(SilentSink))?;
//! let scan = job.wait().await?;
//! println!("stored scan {}", scan.id);
//! # Ok(())
//! # }
//! ```

pub mod assembly;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod job;
pub mod pipeline;
pub mod progress;
pub mod project;
pub mod solution;
pub mod text;
pub mod vcs;

pub use error::{ParseError, ScanError, ScanWarning};
pub use job::{CancelHandle, ScanJobHandle, ScanRunner};
pub use progress::{ChannelSink, ProgressEvent, ProgressSink, ProgressUpdate, SilentSink};
