//! rasactl — deploy Rasa X on Kubernetes and manage its lifecycle.
//!
//! ```text
//! rasactl start demo --project
//! rasactl stop demo
//! rasactl upgrade demo --rasa-x-chart-version 2.1.0
//! rasactl delete demo --prune
//! rasactl list
//! rasactl status demo --details
//! ```

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

mod commands;
mod logging;
mod output;

use commands::{Context, GlobalArgs};

#[derive(Parser)]
#[command(
    name = "rasactl",
    about = "rasactl deploys Rasa X on Kubernetes and manages its lifecycle",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a Rasa X deployment.
    ///
    /// Installs Rasa X into a new namespace on first use, resumes a
    /// stopped deployment, and waits until the application is ready.
    Start(commands::start::StartArgs),
    /// Stop a running deployment, keeping its data
    Stop(commands::stop::StopArgs),
    /// Upgrade the Rasa X release of a deployment
    Upgrade(commands::upgrade::UpgradeArgs),
    /// Delete a deployment
    Delete(commands::delete::DeleteArgs),
    /// List deployments
    #[command(alias = "ls")]
    List(commands::list::ListArgs),
    /// Show the status of a deployment
    Status(commands::status::StatusArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::connect(&cli.global).await?;

    match cli.command {
        Commands::Start(args) => commands::start::run(&ctx, args).await,
        Commands::Stop(args) => commands::stop::run(&ctx, args).await,
        Commands::Upgrade(args) => commands::upgrade::run(&ctx, args).await,
        Commands::Delete(args) => commands::delete::run(&ctx, args).await,
        Commands::List(args) => commands::list::run(&ctx, args).await,
        Commands::Status(args) => commands::status::run(&ctx, args).await,
    }
}

/// Resolves on SIGINT or SIGTERM with the exit code for that signal.
async fn shutdown_signal() -> u8 {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("received Ctrl+C");
            130
        }
        () = terminate => {
            info!("received SIGTERM");
            143
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose, cli.global.debug);

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                output::error(&e);
                ExitCode::FAILURE
            }
        },
        code = shutdown_signal() => {
            eprintln!("Bye");
            ExitCode::from(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rasactl", "stop", "demo", "--kube-context", "kind-rasa", "-v"]).unwrap();
        assert_eq!(cli.global.kube_context.as_deref(), Some("kind-rasa"));
        assert!(cli.global.verbose);
        assert!(matches!(cli.command, Commands::Stop(_)));
    }

    #[test]
    fn list_alias() {
        let cli = Cli::try_parse_from(["rasactl", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::List(_)));
    }
}
