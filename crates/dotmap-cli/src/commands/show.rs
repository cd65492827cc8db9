use anyhow::Context;
use serde::Serialize;

use dotmap_core::entities::{Scan, ScanEvent};
use dotmap_db::repos::scan::ScanSummary;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ShowArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ScanDetail {
    #[serde(flatten)]
    scan: Scan,
    counts: ScanSummary,
    events: Vec<ScanEvent>,
}

/// Handle `dotmap show`.
pub async fn handle(args: &ShowArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let scan = ctx
        .store
        .get_scan(args.scan_id)
        .await
        .with_context(|| format!("scan {} not found", args.scan_id))?;

    if args.graph {
        let graph = ctx.store.load_graph(scan.id).await?;
        return output(&graph, flags.format);
    }

    let counts = ctx.store.scan_summary(scan.id).await?;
    let events = ctx
        .store
        .list_events(scan.id)
        .await?
        .into_iter()
        .map(|stored| stored.item)
        .collect();
    output(
        &ScanDetail {
            scan,
            counts,
            events,
        },
        flags.format,
    )
}
