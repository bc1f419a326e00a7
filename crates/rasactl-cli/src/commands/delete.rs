use clap::Args;

use rasactl_orchestrator::{DeleteOptions, DeleteOutcome};

use super::Context;
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Deployment name
    pub name: Option<String>,

    /// Delete resources and ignore errors
    #[arg(long)]
    pub force: bool,

    /// Delete the namespace too
    #[arg(long)]
    pub prune: bool,
}

pub async fn run(ctx: &Context, args: DeleteArgs) -> anyhow::Result<()> {
    if !args.force {
        ctx.require_hosts_access()?;
    }
    let name = ctx.resolve_name(args.name).await?;
    let options = DeleteOptions {
        force: args.force,
        prune: args.prune,
    };

    match ctx.orchestrator.delete(&name, &options).await? {
        DeleteOutcome::NotFound => {
            output::warning(&format!("The {name} deployment doesn't exist"));
        }
        DeleteOutcome::Deleted(report) if report.is_clean() => {
            output::success(&format!("The {name} deployment has been deleted"));
        }
        DeleteOutcome::Deleted(report) => {
            output::warning(&format!(
                "The {name} deployment has been deleted, {} step(s) failed:",
                report.failures.len()
            ));
            for failure in &report.failures {
                println!("  {}: {}", failure.step, failure.error);
            }
        }
    }
    Ok(())
}
