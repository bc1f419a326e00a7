use clap::Args;

use rasactl_orchestrator::StatusOptions;

use super::Context;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Deployment name
    pub name: Option<String>,

    /// Show the helm release status and running pods
    #[arg(short, long)]
    pub details: bool,
}

pub async fn run(ctx: &Context, args: StatusArgs) -> anyhow::Result<()> {
    let Some(name) = ctx.resolve_optional(args.name).await? else {
        output::nothing_to_show();
        return Ok(());
    };
    let options = StatusOptions {
        details: args.details,
    };

    let Some(report) = ctx.orchestrator.status(&name, &options).await? else {
        output::nothing_to_show();
        return Ok(());
    };

    for line in output::status_lines(&report) {
        println!("{line}");
    }
    if let Some(details) = &report.details {
        println!();
        println!("{}", output::release_table(&details.release));
        println!();
        println!("{}", output::pods_table(&details.pods));
    }
    Ok(())
}
