use clap::{ArgAction, Args};

use rasactl_orchestrator::UpgradeOptions;

use super::{Context, ReleaseArgs};
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct UpgradeArgs {
    /// Deployment name
    pub name: Option<String>,

    /// Roll back the changes made by a failed upgrade
    #[arg(long)]
    pub atomic: bool,

    /// Reuse the last release's values and merge in any overrides
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub reuse_values: bool,

    #[command(flatten)]
    pub release: ReleaseArgs,
}

pub async fn run(ctx: &Context, args: UpgradeArgs) -> anyhow::Result<()> {
    let mut release = args.release.options(&ctx.config)?;
    release.atomic = args.atomic;
    release.reuse_values = args.reuse_values;
    let name = ctx.resolve_name(args.name).await?;

    let outcome = ctx
        .orchestrator
        .upgrade(&name, &UpgradeOptions { release })
        .await?;

    output::success(&format!(
        "Rasa X for the {name} deployment has been upgraded, version {}: {}",
        outcome.version.rasa_x, outcome.endpoint.url
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: UpgradeArgs,
    }

    #[test]
    fn reuse_values_defaults_to_true() {
        let args = Harness::try_parse_from(["upgrade", "demo"]).unwrap().args;
        assert!(args.reuse_values);
        assert!(!args.atomic);
    }

    #[test]
    fn reuse_values_can_be_turned_off() {
        let args = Harness::try_parse_from(["upgrade", "demo", "--reuse-values", "false", "--atomic"])
            .unwrap()
            .args;
        assert!(!args.reuse_values);
        assert!(args.atomic);
    }
}
