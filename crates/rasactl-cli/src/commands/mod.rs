pub mod delete;
pub mod list;
pub mod start;
pub mod status;
pub mod stop;
pub mod upgrade;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, anyhow, bail};
use clap::Args;
use tracing::debug;

use rasactl_core::config::parse_duration;
use rasactl_core::types::DEFAULT_RELEASE_NAME;
use rasactl_core::{RasactlConfig, ResourceManager};
use rasactl_health::HttpProber;
use rasactl_helm::HelmReleaseManager;
use rasactl_k8s::KubernetesManager;
use rasactl_kind::KindNodeManager;
use rasactl_orchestrator::{Orchestrator, OrchestratorSettings, ReleaseOptions};
use rasactl_state::SecretStateStore;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Config file (default: $RASACTL_CONFIG, then <config dir>/rasactl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Kubernetes context to use instead of the current one
    #[arg(long, global = true)]
    pub kube_context: Option<String>,

    /// Log what rasactl does
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log everything, including external tool calls
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Release flags shared by start and upgrade.
#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    /// Time to wait for Rasa X to be ready, e.g. "10m" (default: from config)
    #[arg(long)]
    pub wait_timeout: Option<String>,

    /// Helm chart version to use
    #[arg(long)]
    pub rasa_x_chart_version: Option<String>,

    /// Helm release name to manage
    #[arg(long, default_value = DEFAULT_RELEASE_NAME)]
    pub rasa_x_release_name: String,

    /// Path to an extra values file for the chart
    #[arg(long)]
    pub values_file: Option<PathBuf>,
}

impl ReleaseArgs {
    pub fn options(&self, config: &RasactlConfig) -> anyhow::Result<ReleaseOptions> {
        let wait_timeout = match &self.wait_timeout {
            Some(value) => parse_duration(value)?,
            None => config.readiness.timeout()?,
        };
        Ok(ReleaseOptions {
            release_name: self.rasa_x_release_name.clone(),
            chart_version: self.rasa_x_chart_version.clone(),
            values_file: self.values_file.clone(),
            wait_timeout,
            ..ReleaseOptions::default()
        })
    }
}

/// Everything a command needs, wired from configuration.
pub struct Context {
    pub config: RasactlConfig,
    pub cluster: Arc<KubernetesManager>,
    pub prober: Arc<HttpProber>,
    pub orchestrator: Orchestrator,
    /// Boxes and summaries are only shown when logs are quiet.
    pub boxes: bool,
}

impl Context {
    pub async fn connect(global: &GlobalArgs) -> anyhow::Result<Self> {
        let mut config = RasactlConfig::load(global.config.as_deref()).context("can't load configuration")?;
        if let Some(context) = &global.kube_context {
            config.kubernetes.context = Some(context.clone());
        }

        let cluster = Arc::new(
            KubernetesManager::connect(&config)
                .await
                .context("can't connect to the Kubernetes cluster")?,
        );
        let backend = cluster.backend().clone();
        debug!(?backend, "detected backend");

        let nodes = Arc::new(KindNodeManager::for_backend(&config.kind.docker, &backend));
        let releases = Arc::new(HelmReleaseManager::new(
            &config.helm,
            config.kubernetes.context.as_deref(),
        ));
        let state = Arc::new(SecretStateStore::new(cluster.kubectl().tool().clone()));
        let prober = Arc::new(HttpProber::new(
            config.readiness.interval()?,
            config.readiness.max_interval()?,
        ));

        let orchestrator = Orchestrator::new(cluster.clone(), nodes, releases, state, prober.clone())
            .with_settings(OrchestratorSettings {
                domain: config.hosts.domain.clone(),
            });

        Ok(Self {
            config,
            cluster,
            prober,
            orchestrator,
            boxes: !(global.verbose || global.debug),
        })
    }

    /// The deployment to act on: the given name, or the only managed
    /// deployment when there is exactly one.
    pub async fn resolve_name(&self, name: Option<String>) -> anyhow::Result<String> {
        self.resolve_optional(name)
            .await?
            .ok_or_else(|| anyhow!("you have to pass a deployment name"))
    }

    /// Like [`Context::resolve_name`], but `None` when there are no
    /// deployments at all.
    pub async fn resolve_optional(&self, name: Option<String>) -> anyhow::Result<Option<String>> {
        if let Some(name) = name {
            return Ok(Some(name));
        }
        let managed = self.cluster.list_managed().await?;
        pick_single(managed)
    }

    /// Local hostnames are added to the hosts file, which usually needs
    /// elevated rights.
    pub fn require_hosts_access(&self) -> anyhow::Result<()> {
        let hosts = self.cluster.hosts();
        if self.cluster.backend().routes_local_hostnames() && !hosts.is_writable() {
            bail!(
                "rasactl needs write access to {} to route local hostnames, run it with sudo",
                hosts.path().display()
            );
        }
        Ok(())
    }
}

fn pick_single(mut managed: Vec<String>) -> anyhow::Result<Option<String>> {
    match managed.len() {
        0 => Ok(None),
        1 => Ok(managed.pop()),
        n => bail!("found {n} deployments, you have to pass a deployment name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn release_args() -> ReleaseArgs {
        ReleaseArgs {
            wait_timeout: None,
            rasa_x_chart_version: None,
            rasa_x_release_name: DEFAULT_RELEASE_NAME.to_string(),
            values_file: None,
        }
    }

    #[test]
    fn single_deployment_is_picked() {
        assert_eq!(pick_single(vec!["demo".to_string()]).unwrap().as_deref(), Some("demo"));
        assert_eq!(pick_single(vec![]).unwrap(), None);
        let err = pick_single(vec!["a".to_string(), "b".to_string()]).unwrap_err();
        assert!(err.to_string().contains("found 2 deployments"));
    }

    #[test]
    fn wait_timeout_falls_back_to_config() {
        let config = RasactlConfig::default();
        let options = release_args().options(&config).unwrap();
        assert_eq!(options.wait_timeout, Duration::from_secs(600));
        assert_eq!(options.release_name, "rasa-x");
    }

    #[test]
    fn wait_timeout_flag_overrides_config() {
        let args = ReleaseArgs {
            wait_timeout: Some("90s".to_string()),
            rasa_x_chart_version: Some("2.1.0".to_string()),
            ..release_args()
        };
        let options = args.options(&RasactlConfig::default()).unwrap();
        assert_eq!(options.wait_timeout, Duration::from_secs(90));
        assert_eq!(options.chart_version.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn bad_wait_timeout_is_rejected() {
        let args = ReleaseArgs {
            wait_timeout: Some("soon".to_string()),
            ..release_args()
        };
        assert!(args.options(&RasactlConfig::default()).is_err());
    }
}
