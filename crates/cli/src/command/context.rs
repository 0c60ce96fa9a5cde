use anyhow::Result;

use super::CommandContext;
use crate::render::render_snapshot;

pub(crate) fn run_context(ctx: &CommandContext, json: bool, full: bool) -> Result<String> {
    let snapshot = ctx.assemble()?;
    if json {
        return Ok(serde_json::to_string_pretty(&snapshot)?);
    }
    if full {
        return Ok(snapshot.render_context());
    }
    Ok(render_snapshot(&snapshot))
}
