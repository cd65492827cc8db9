use anyhow::bail;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DeleteArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct Deleted {
    scan_id: i64,
    deleted: bool,
}

/// Handle `dotmap delete`.
pub async fn handle(
    args: &DeleteArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if !ctx.store.delete_scan(args.scan_id).await? {
        bail!("scan {} not found", args.scan_id);
    }
    tracing::info!(scan_id = args.scan_id, "scan deleted");
    output(
        &Deleted {
            scan_id: args.scan_id,
            deleted: true,
        },
        flags.format,
    )
}
