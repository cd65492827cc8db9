use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `dotmap schema`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let keys = ctx.store.schema_foreign_keys().await?;
    output(&keys, flags.format)
}
