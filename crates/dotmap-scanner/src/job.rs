//! Background scan jobs.
//!
//! [`ScanRunner::submit`] checks the root, spawns the scan on the tokio
//! runtime, and returns a [`ScanJobHandle`] immediately. Filesystem phases
//! run on the blocking pool. The sink sees exactly one of `on_complete` or
//! `on_failed` per submitted job.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use dotmap_config::ScanConfig;
use dotmap_core::entities::Scan;
use dotmap_core::enums::ScanPhase;
use dotmap_db::store::GraphStore;

use crate::discovery::PathDiscovery;
use crate::error::ScanError;
use crate::pipeline::ScanPipeline;
use crate::progress::{PhaseTracker, ProgressSink};

pub struct ScanRunner {
    store: Arc<GraphStore>,
    pipeline: ScanPipeline,
}

impl ScanRunner {
    #[must_use]
    pub const fn new(store: Arc<GraphStore>, config: ScanConfig) -> Self {
        Self {
            store,
            pipeline: ScanPipeline::new(config),
        }
    }

    /// Start scanning `root` in the background.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::RepositoryNotFound` if `root` is not an existing
    /// directory. No job is started and the sink is not called.
    pub fn submit(
        &self,
        root: impl Into<PathBuf>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ScanJobHandle, ScanError> {
        let root = PathDiscovery::resolve_root(&root.into())?;
        let id = new_job_id()?;
        let cancel = Arc::new(AtomicBool::new(false));

        info!(job = %id, root = %root.display(), "scan submitted");
        sink.on_start(&id);

        let job = Job {
            id: id.clone(),
            root,
            pipeline: self.pipeline.clone(),
            store: Arc::clone(&self.store),
            cancel: Arc::clone(&cancel),
        };
        let handle = tokio::spawn(job.run(sink));

        Ok(ScanJobHandle {
            id,
            cancel: CancelHandle(cancel),
            handle,
        })
    }
}

/// Cloneable cancel switch for one job.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Ask the job to stop at the next phase boundary. A job that is
    /// already committing finishes normally.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Handle to a submitted scan.
pub struct ScanJobHandle {
    id: String,
    cancel: CancelHandle,
    handle: JoinHandle<Result<Scan, ScanError>>,
}

impl ScanJobHandle {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A switch that can cancel the job after `wait` has taken the handle.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job to end.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the scan, or `ScanError::Worker` if the
    /// task panicked.
    pub async fn wait(self) -> Result<Scan, ScanError> {
        self.handle
            .await
            .map_err(|e| ScanError::Worker(e.to_string()))?
    }
}

struct Job {
    id: String,
    root: PathBuf,
    pipeline: ScanPipeline,
    store: Arc<GraphStore>,
    cancel: Arc<AtomicBool>,
}

impl Job {
    async fn run(self, sink: Arc<dyn ProgressSink>) -> Result<Scan, ScanError> {
        let id = self.id.clone();
        let result = self.execute(Arc::clone(&sink)).await;
        match &result {
            Ok(scan) => {
                info!(job = %id, scan_id = scan.id, "scan complete");
                sink.on_complete(scan.id);
            }
            Err(err) => {
                warn!(job = %id, error = %err, "scan failed");
                sink.on_failed(&err.to_string());
            }
        }
        result
    }

    async fn execute(self, sink: Arc<dyn ProgressSink>) -> Result<Scan, ScanError> {
        let mut tracker = PhaseTracker::new(sink);
        tracker.enter(ScanPhase::Initializing, format!("job {} started", self.id));

        let Self {
            root,
            pipeline,
            store,
            cancel,
            ..
        } = self;

        let worker_cancel = Arc::clone(&cancel);
        let (collected, mut tracker) = tokio::task::spawn_blocking(move || {
            pipeline
                .collect(&root, &mut tracker, &worker_cancel)
                .map(|collected| (collected, tracker))
        })
        .await
        .map_err(|e| ScanError::Worker(e.to_string()))??;

        if cancel.load(Ordering::Relaxed) {
            return Err(ScanError::Cancelled);
        }

        let scan = ScanPipeline::commit(&store, &collected, &mut tracker).await?;
        tracker.enter(
            ScanPhase::Complete,
            format!(
                "stored scan {} ({} warnings)",
                scan.id,
                collected.warnings.len()
            ),
        );
        Ok(scan)
    }
}

/// `job-` followed by eight random hex digits.
fn new_job_id() -> Result<String, ScanError> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|e| ScanError::Worker(format!("cannot generate job id: {e}")))?;
    let mut id = String::from("job-");
    for b in bytes {
        let _ = write!(id, "{b:02x}");
    }
    Ok(id)
}
