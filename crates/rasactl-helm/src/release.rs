//! HelmReleaseManager — `ReleaseManager` over the helm CLI.

use std::io::Write;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use rasactl_core::config::HelmConfig;
use rasactl_core::exec::Tool;
use rasactl_core::naming::validate_chart_version;
use rasactl_core::{RasactlError, RasactlResult, ReleaseInfo, ReleaseManager, ReleaseSpec};

use crate::values::{generated_values, release_args, upgrade_flags};

/// One row of `helm list -o json`.
#[derive(Debug, Deserialize)]
struct ListedRelease {
    name: String,
    status: String,
}

/// The parts of `helm status -o json` we read.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    name: String,
    #[serde(default)]
    version: u32,
    info: StatusInfo,
    #[serde(default)]
    chart: Option<ChartResponse>,
}

#[derive(Debug, Deserialize)]
struct StatusInfo {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    metadata: ChartMetadata,
}

#[derive(Debug, Deserialize)]
struct ChartMetadata {
    name: String,
    #[serde(default)]
    version: String,
}

fn malformed(e: serde_json::Error) -> RasactlError {
    RasactlError::Command {
        program: "helm".to_string(),
        message: format!("unexpected output: {e}"),
    }
}

/// Whether `helm list` output holds `release` in the deployed state.
pub fn listed_as_deployed(list: &serde_json::Value, release: &str) -> RasactlResult<bool> {
    let releases: Vec<ListedRelease> = serde_json::from_value(list.clone()).map_err(malformed)?;
    Ok(releases
        .iter()
        .any(|r| r.name == release && r.status == "deployed"))
}

pub fn parse_status(status: &serde_json::Value) -> RasactlResult<ReleaseInfo> {
    let resp: StatusResponse = serde_json::from_value(status.clone()).map_err(malformed)?;
    let (chart_name, chart_version) = resp
        .chart
        .map(|c| (c.metadata.name, c.metadata.version))
        .unwrap_or_default();
    Ok(ReleaseInfo {
        name: resp.name,
        status: resp.info.status,
        revision: resp.version,
        chart_name,
        chart_version,
    })
}

pub struct HelmReleaseManager {
    helm: Tool,
    repository: String,
    chart: String,
}

impl HelmReleaseManager {
    pub fn new(config: &HelmConfig, kube_context: Option<&str>) -> Self {
        let mut helm = Tool::new(&config.binary);
        if let Some(ctx) = kube_context {
            helm = helm.with_base_args(["--kube-context", ctx]);
        }
        Self {
            helm,
            repository: config.repository.clone(),
            chart: config.chart.clone(),
        }
    }

    /// Run install or upgrade with the generated values file in place.
    async fn apply(&self, subcommand: &str, spec: &ReleaseSpec, extra: &[String]) -> RasactlResult<()> {
        let initial = subcommand == "install";
        if let Some(version) = &spec.chart_version {
            validate_chart_version(version)?;
        }

        let generated = write_values(spec, initial)?;
        let generated_path = generated.path().to_string_lossy().into_owned();
        let mut args = vec![subcommand.to_string()];
        args.extend(release_args(spec, &self.chart, &self.repository, &generated_path));
        args.extend_from_slice(extra);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.helm.run(&args).await?;
        Ok(())
    }
}

/// Render generated values into a temporary file kept alive by the caller.
fn write_values(spec: &ReleaseSpec, initial: bool) -> RasactlResult<tempfile::NamedTempFile> {
    let io_err = |e: std::io::Error| RasactlError::Command {
        program: "helm".to_string(),
        message: format!("writing values file: {e}"),
    };
    let mut file = tempfile::Builder::new()
        .prefix("rasactl-values-")
        .suffix(".json")
        .tempfile()
        .map_err(io_err)?;
    let body = serde_json::to_vec_pretty(&generated_values(spec, initial)).map_err(malformed)?;
    file.write_all(&body).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(file)
}

#[async_trait]
impl ReleaseManager for HelmReleaseManager {
    async fn is_deployed(&self, namespace: &str, release: &str) -> RasactlResult<bool> {
        let filter = format!("^{release}$");
        let list = self
            .helm
            .run_json(&["list", "--namespace", namespace, "--filter", &filter, "--all", "-o", "json"])
            .await?;
        listed_as_deployed(&list, release)
    }

    async fn install(&self, spec: &ReleaseSpec) -> RasactlResult<()> {
        info!(namespace = %spec.namespace, release = %spec.release_name, "installing release");
        self.apply("install", spec, &[]).await?;
        info!(namespace = %spec.namespace, release = %spec.release_name, "release installed");
        Ok(())
    }

    async fn upgrade(&self, spec: &ReleaseSpec) -> RasactlResult<()> {
        info!(
            namespace = %spec.namespace,
            release = %spec.release_name,
            resume = spec.resume,
            "upgrading release"
        );
        self.apply("upgrade", spec, &upgrade_flags(spec)).await?;
        info!(namespace = %spec.namespace, release = %spec.release_name, "release upgraded");
        Ok(())
    }

    async fn uninstall(&self, namespace: &str, release: &str) -> RasactlResult<()> {
        match self.helm.run(&["uninstall", release, "--namespace", namespace]).await {
            Ok(_) => {
                info!(%namespace, %release, "release uninstalled");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(%namespace, %release, "release not installed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn status(&self, namespace: &str, release: &str) -> RasactlResult<ReleaseInfo> {
        let status = self
            .helm
            .run_json(&["status", release, "--namespace", namespace, "-o", "json"])
            .await?;
        parse_status(&status)
    }

    async fn values(&self, namespace: &str, release: &str) -> RasactlResult<serde_json::Value> {
        self.helm
            .run_json(&["get", "values", release, "--namespace", namespace, "--all", "-o", "json"])
            .await
    }
}
