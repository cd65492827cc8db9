use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;

use dotmap_core::entities::Scan;
use dotmap_db::repos::scan::ScanSummary;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScanArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::BarSink;

#[derive(Debug, Serialize)]
struct ScanReport {
    job_id: String,
    #[serde(flatten)]
    scan: Scan,
    counts: ScanSummary,
}

/// Handle `dotmap scan`.
pub async fn handle(args: &ScanArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let job = ctx
        .runner()
        .submit(&args.path, Arc::new(BarSink::new()))
        .with_context(|| format!("cannot scan {}", args.path.display()))?;
    let job_id = job.id().to_string();

    let cancel = job.cancel_handle();
    let timeout = args.timeout;
    let watched = job_id.clone();
    let watchdog = tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!(job = %watched, "interrupted, cancelling scan");
            }
            () = deadline(timeout) => {
                tracing::warn!(job = %watched, "timed out, cancelling scan");
            }
        }
        cancel.cancel();
    });

    let result = job.wait().await;
    watchdog.abort();
    let scan = result.with_context(|| format!("scan job {job_id} failed"))?;

    let counts = ctx.store.scan_summary(scan.id).await?;
    output(
        &ScanReport {
            job_id,
            scan,
            counts,
        },
        flags.format,
    )
}

async fn deadline(timeout: Option<u64>) {
    match timeout {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => std::future::pending().await,
    }
}
