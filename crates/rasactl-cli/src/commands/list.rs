use clap::Args;

use super::Context;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Deployment to mark as current
    pub name: Option<String>,
}

pub async fn run(ctx: &Context, args: ListArgs) -> anyhow::Result<()> {
    let rows = ctx.orchestrator.list(args.name.as_deref()).await?;
    if rows.is_empty() {
        output::nothing_to_show();
    } else {
        println!("{}", output::list_table(&rows));
    }
    Ok(())
}
