use clap::Args;

use super::Context;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct StopArgs {
    /// Deployment name
    pub name: Option<String>,
}

pub async fn run(ctx: &Context, args: StopArgs) -> anyhow::Result<()> {
    let name = ctx.resolve_name(args.name).await?;
    ctx.orchestrator.stop(&name).await?;
    output::success(&format!("Rasa X for the {name} deployment has been stopped"));
    Ok(())
}
