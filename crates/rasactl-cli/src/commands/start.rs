use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use colored::Color;

use rasactl_core::types::DEFAULT_PASSWORD;
use rasactl_orchestrator::{StartOptions, StartPath};

use super::{Context, ReleaseArgs};
use crate::output;

#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    /// Deployment name, also used as the namespace
    pub name: Option<String>,

    /// Absolute path to the project directory mounted into kind
    #[arg(long)]
    pub project_path: Option<PathBuf>,

    /// Use the current directory as the project directory; ignored when
    /// --project-path is given
    #[arg(short, long)]
    pub project: bool,

    /// Rasa X password
    #[arg(long, default_value = DEFAULT_PASSWORD)]
    pub rasa_x_password: String,

    #[command(flatten)]
    pub release: ReleaseArgs,
}

impl StartArgs {
    fn project_dir(&self) -> anyhow::Result<Option<PathBuf>> {
        match (&self.project_path, self.project) {
            (Some(path), _) => Ok(Some(path.clone())),
            (None, true) => std::env::current_dir()
                .map(Some)
                .context("can't read the current directory"),
            (None, false) => Ok(None),
        }
    }
}

pub async fn run(ctx: &Context, args: StartArgs) -> anyhow::Result<()> {
    ctx.require_hosts_access()?;

    let mut release = args.release.options(&ctx.config)?;
    release.password = args.rasa_x_password.clone();
    let options = StartOptions {
        project_path: args.project_dir()?,
        release,
    };
    let name = ctx.resolve_name(args.name).await?;

    let outcome = ctx.orchestrator.start(&name, &options).await?;

    match (&outcome.summary, outcome.path) {
        (Some(summary), _) if ctx.boxes => {
            output::print_box(&output::summary_lines(&name, summary), Color::Green);
            if !ctx.prober.is_reachable(&summary.url).await {
                output::print_box(&output::unreachable_hint_lines(&summary.url), Color::Yellow);
            }
        }
        (_, StartPath::AlreadyRunning) => {
            output::success(&format!(
                "Rasa X for the {name} deployment is already running: {}",
                outcome.endpoint.url
            ));
        }
        _ => {
            output::success(&format!(
                "Rasa X for the {name} deployment is running: {}",
                outcome.endpoint.url
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: StartArgs,
    }

    fn parse(argv: &[&str]) -> StartArgs {
        let mut full = vec!["start"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn defaults() {
        let args = parse(&["demo"]);
        assert_eq!(args.name.as_deref(), Some("demo"));
        assert_eq!(args.rasa_x_password, "rasaxlocal");
        assert_eq!(args.release.rasa_x_release_name, "rasa-x");
        assert_eq!(args.project_dir().unwrap(), None);
    }

    #[test]
    fn project_path_wins_over_project_flag() {
        let args = parse(&["demo", "-p", "--project-path", "/data/bot"]);
        assert_eq!(args.project_dir().unwrap(), Some(PathBuf::from("/data/bot")));
    }

    #[test]
    fn project_flag_uses_current_directory() {
        let args = parse(&["demo", "--project"]);
        assert_eq!(args.project_dir().unwrap(), Some(std::env::current_dir().unwrap()));
    }
}
