use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `dotmap list`.
pub async fn handle(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(ctx.config.general.default_limit);
    let scans = ctx.store.list_scans(limit).await?;
    output(&scans, flags.format)
}
