//! Orchestrator — the deployment operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use rasactl_core::naming::{LOCAL_DOMAIN, local_hostname, node_name, validate_name};
use rasactl_core::types::{DEFAULT_RELEASE_NAME, UNKNOWN_VERSION};
use rasactl_core::{
    BackendInfo, DeploymentRecord, Endpoint, NodeManager, RasactlError, RasactlResult,
    ReadinessProber, ReleaseManager, ReleasePlacement, ResourceManager, StateStore, VersionInfo,
};

use crate::options::{DeleteOptions, StartOptions, StatusOptions, UpgradeOptions};
use crate::outcome::{
    DeleteOutcome, DeploymentState, InstallSummary, ListRow, StartOutcome, StartPath,
    StatusDetails, StatusReport, UpgradeOutcome,
};
use crate::phase::Phase;
use crate::teardown::{ErrorPolicy, Teardown};

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Domain for local hostnames, `<namespace>.<domain>`.
    pub domain: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            domain: LOCAL_DOMAIN.to_string(),
        }
    }
}

/// Drives deployments through their lifecycle.
pub struct Orchestrator {
    resources: Arc<dyn ResourceManager>,
    nodes: Arc<dyn NodeManager>,
    releases: Arc<dyn ReleaseManager>,
    state: Arc<dyn StateStore>,
    prober: Arc<dyn ReadinessProber>,
    settings: OrchestratorSettings,
}

/// Check a project path is an existing directory; returns it absolute.
pub async fn validate_project_path(path: &Path) -> RasactlResult<PathBuf> {
    let invalid = |reason: String| RasactlError::InvalidPath {
        path: path.to_path_buf(),
        reason,
    };
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    if !meta.is_dir() {
        return Err(invalid("the path can't point to a file, it has to be a directory".to_string()));
    }
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| invalid(e.to_string()))
}

fn release_of(record: Option<&DeploymentRecord>) -> &str {
    record.map_or(DEFAULT_RELEASE_NAME, |r| r.release_name.as_str())
}

impl Orchestrator {
    pub fn new(
        resources: Arc<dyn ResourceManager>,
        nodes: Arc<dyn NodeManager>,
        releases: Arc<dyn ReleaseManager>,
        state: Arc<dyn StateStore>,
        prober: Arc<dyn ReadinessProber>,
    ) -> Self {
        Self {
            resources,
            nodes,
            releases,
            state,
            prober,
            settings: OrchestratorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn backend(&self) -> &BackendInfo {
        self.resources.backend()
    }

    // ── Start ─────────────────────────────────────────────────────

    /// Install, resume or confirm a deployment, then wait until it is ready.
    pub async fn start(&self, namespace: &str, options: &StartOptions) -> RasactlResult<StartOutcome> {
        validate_name(namespace)?;
        if options.project_path.is_some() && !self.nodes.supports_local_nodes() {
            return Err(RasactlError::UnsupportedConfiguration(
                "it looks like you don't use kind as the current Kubernetes context, \
                 the project path is supported only with kind"
                    .to_string(),
            ));
        }

        self.ensure_namespace(namespace).await?;

        let release = options.release.release_name.as_str();
        let deployed = self.releases.is_deployed(namespace, release).await?;
        let running = self.resources.is_running(namespace, release).await?;
        let observed = Phase::observe(deployed, running);
        debug!(%namespace, deployed, running, phase = ?observed, "observed deployment");

        let (path, phase) = match observed {
            Phase::Absent => {
                let phase = observed.advance(namespace, Phase::Installing)?;
                self.install(namespace, options).await?;
                (StartPath::Installed, phase)
            }
            Phase::Stopped => {
                self.resume(namespace, options).await?;
                (StartPath::Resumed, observed)
            }
            _ => {
                info!(%namespace, "deployment already running");
                (StartPath::AlreadyRunning, observed)
            }
        };

        let (endpoint, version) = self
            .confirm_ready(namespace, release, options.release.wait_timeout)
            .await?;
        phase.advance(namespace, Phase::Running)?;

        let summary = (path == StartPath::Installed).then(|| InstallSummary {
            url: endpoint.url.clone(),
            version: version.clone(),
            password: options.release.password.clone(),
        });
        Ok(StartOutcome {
            path,
            endpoint,
            version,
            summary,
        })
    }

    async fn ensure_namespace(&self, namespace: &str) -> RasactlResult<()> {
        if !self.resources.exists(namespace).await? {
            self.resources.create(namespace).await?;
        }
        self.resources.add_label(namespace).await
    }

    async fn install(&self, namespace: &str, options: &StartOptions) -> RasactlResult<()> {
        let mut spec = options.release.spec(namespace);

        let project_path = match &options.project_path {
            Some(path) => {
                let path = validate_project_path(path).await?;
                self.nodes.create_and_join(namespace, &path).await?;
                let claim = self.resources.create_volume(namespace, &path).await?;
                spec.volume_claim = Some(claim);
                spec.node_name = Some(node_name(namespace));
                Some(path)
            }
            None => None,
        };

        if self.backend().routes_local_hostnames() {
            self.resources.add_host_entry(namespace).await?;
            spec.hostname = Some(local_hostname(namespace, &self.settings.domain));
        }

        // Persisted before the install so a retry after a failed install
        // still knows about the node and volume.
        let record = DeploymentRecord::new(&spec.release_name, project_path);
        self.state.write(namespace, &record).await?;

        self.releases.install(&spec).await
    }

    async fn resume(&self, namespace: &str, options: &StartOptions) -> RasactlResult<()> {
        info!(%namespace, "starting stopped deployment");

        let mut spec = options.release.spec(namespace);
        spec.resume = true;
        if let Some(placement) = self.project_placement(namespace, &spec.release_name).await? {
            self.nodes.start(namespace).await?;
            placement.apply(&mut spec);
        }
        if self.backend().routes_local_hostnames() {
            spec.hostname = Some(local_hostname(namespace, &self.settings.domain));
        }

        self.releases.upgrade(&spec).await?;
        self.resources.scale_up(namespace, &spec.release_name).await
    }

    /// Project mount and node pinning to carry into an upgrade.
    ///
    /// Taken from the deployment record; when the record is gone, read
    /// back from the release's current values.
    async fn project_placement(&self, namespace: &str, release: &str) -> RasactlResult<Option<ReleasePlacement>> {
        if !self.nodes.supports_local_nodes() {
            return Ok(None);
        }
        if let Some(record) = self.state.read_optional(namespace).await? {
            return Ok(record.has_project().then(|| ReleasePlacement::project(namespace)));
        }

        warn!(%namespace, "no deployment record found, using the release values");
        match self.releases.values(namespace, release).await {
            Ok(values) => Ok(ReleasePlacement::from_values(&values)),
            Err(e) => {
                warn!(%namespace, error = %e, "can't read the release values");
                Ok(None)
            }
        }
    }

    /// Resolve the endpoint, wait for readiness, and record the versions
    /// the application reports.
    async fn confirm_ready(
        &self,
        namespace: &str,
        release: &str,
        timeout: Duration,
    ) -> RasactlResult<(Endpoint, VersionInfo)> {
        let endpoint = self.resources.resolve_endpoint(namespace, release).await?;
        self.prober.wait_for_ready(&endpoint.url, timeout).await?;
        let version = self
            .prober
            .version(&endpoint.url, endpoint.token.as_deref())
            .await?;

        let mut record = self
            .state
            .read_optional(namespace)
            .await?
            .unwrap_or_else(|| DeploymentRecord::new(release, None));
        record.apply_version(&version);
        self.state.write(namespace, &record).await?;

        info!(%namespace, url = %endpoint.url, version = %version.rasa_x, "deployment ready");
        Ok((endpoint, version))
    }

    // ── Stop ──────────────────────────────────────────────────────

    /// Scale the deployment to zero and stop its local node.
    pub async fn stop(&self, namespace: &str) -> RasactlResult<()> {
        validate_name(namespace)?;
        self.require_namespace(namespace).await?;

        let record = self.state.read_optional(namespace).await?;
        let release = release_of(record.as_ref());
        self.resources.scale_down(namespace, release).await?;

        if record.as_ref().is_some_and(DeploymentRecord::has_project) && self.nodes.supports_local_nodes() {
            self.nodes.stop(namespace).await?;
        }
        Phase::Running.advance(namespace, Phase::Stopped)?;
        Ok(())
    }

    async fn require_namespace(&self, namespace: &str) -> RasactlResult<()> {
        if self.resources.exists(namespace).await? {
            Ok(())
        } else {
            Err(RasactlError::NotFound(format!(
                "the {namespace} deployment doesn't exist"
            )))
        }
    }

    // ── Upgrade ───────────────────────────────────────────────────

    /// Re-run the release upgrade and wait for the result to be ready.
    ///
    /// A failed upgrade leaves the deployment record as it was.
    pub async fn upgrade(&self, namespace: &str, options: &UpgradeOptions) -> RasactlResult<UpgradeOutcome> {
        validate_name(namespace)?;
        self.require_namespace(namespace).await?;

        let mut spec = options.release.spec(namespace);
        if let Some(placement) = self.project_placement(namespace, &spec.release_name).await? {
            placement.apply(&mut spec);
        }
        if self.backend().routes_local_hostnames() {
            spec.hostname = Some(local_hostname(namespace, &self.settings.domain));
        }

        let phase = Phase::Running.advance(namespace, Phase::Upgrading)?;
        let result = match self.releases.upgrade(&spec).await {
            Ok(()) => {
                self.confirm_ready(namespace, &spec.release_name, options.release.wait_timeout)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok((endpoint, version)) => {
                phase.advance(namespace, Phase::Running)?;
                Ok(UpgradeOutcome { endpoint, version })
            }
            Err(e) => {
                warn!(%namespace, error = %e, "upgrade failed, deployment record left unchanged");
                phase.advance(namespace, Phase::Inconsistent)?;
                Err(e)
            }
        }
    }

    // ── Delete ────────────────────────────────────────────────────

    /// Tear the deployment down.
    ///
    /// Without `force` the first failing step aborts; with `force` every
    /// step runs and failures are collected in the report.
    pub async fn delete(&self, namespace: &str, options: &DeleteOptions) -> RasactlResult<DeleteOutcome> {
        validate_name(namespace)?;
        let mut teardown = Teardown::new(namespace, ErrorPolicy::from_force(options.force));

        let exists = teardown
            .outcome("check namespace", self.resources.exists(namespace).await)?
            .unwrap_or(true);
        if !exists {
            info!(%namespace, "namespace does not exist, nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        }
        if !options.force && !self.resources.is_managed(namespace).await? {
            return Err(RasactlError::Unmanaged(namespace.to_string()));
        }

        let phase = Phase::Running.advance(namespace, Phase::Deleting)?;

        let record = teardown
            .outcome("read state", self.state.read_optional(namespace).await)?
            .flatten();
        let release = release_of(record.as_ref());

        teardown.step("uninstall release", self.releases.uninstall(namespace, release).await)?;
        teardown.step("delete state", self.state.delete(namespace).await)?;
        teardown.step("remove ownership label", self.resources.delete_label(namespace).await)?;

        let project_used = record.as_ref().is_some_and(DeploymentRecord::has_project);
        if project_used || options.force {
            teardown.step("delete volume", self.resources.delete_volume(namespace).await)?;
            if self.nodes.supports_local_nodes() {
                teardown.step("delete node", self.nodes.delete(namespace).await)?;
                let node = node_name(namespace);
                teardown.step("delete node object", self.resources.delete_node(&node).await)?;
            }
        }

        if self.backend().routes_local_hostnames() {
            teardown.step("remove hosts entry", self.resources.remove_host_entry(namespace).await)?;
        }

        if options.prune {
            teardown.step("delete namespace", self.resources.delete(namespace).await)?;
            phase.advance(namespace, Phase::Absent)?;
        } else {
            phase.advance(namespace, Phase::Stopped)?;
        }

        let report = teardown.finish();
        if !report.is_clean() {
            warn!(%namespace, failed = report.failures.len(), "delete finished with failures");
        }
        Ok(DeleteOutcome::Deleted(report))
    }

    // ── List / Status ─────────────────────────────────────────────

    /// One row per managed namespace, in backend order.
    pub async fn list(&self, current: Option<&str>) -> RasactlResult<Vec<ListRow>> {
        let namespaces = self.resources.list_managed().await?;
        let mut rows = Vec::with_capacity(namespaces.len());

        for namespace in &namespaces {
            let record = match self.state.read_optional(namespace).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(%namespace, error = %e, "can't read the deployment record");
                    None
                }
            };
            let release = release_of(record.as_ref());
            let state = DeploymentState::from_running(self.resources.is_running(namespace, release).await?);
            let is_current = current == Some(namespace.as_str());

            let row = match self.live_version(namespace, release).await {
                Ok(version) => ListRow::live(namespace, is_current, state, &version),
                Err(e) => {
                    debug!(%namespace, error = %e, "live version unavailable, using the record");
                    ListRow::recorded(namespace, is_current, state, record.as_ref())
                }
            };
            rows.push(row);
        }
        Ok(rows)
    }

    async fn live_version(&self, namespace: &str, release: &str) -> RasactlResult<VersionInfo> {
        let endpoint = self.resources.resolve_endpoint(namespace, release).await?;
        self.prober
            .version(&endpoint.url, endpoint.token.as_deref())
            .await
    }

    /// Summary of one deployment; `None` when there is nothing to show.
    pub async fn status(&self, namespace: &str, options: &StatusOptions) -> RasactlResult<Option<StatusReport>> {
        validate_name(namespace)?;
        if !self.resources.exists(namespace).await? || !self.resources.is_managed(namespace).await? {
            return Ok(None);
        }

        let record = match self.state.read_optional(namespace).await {
            Ok(record) => record,
            Err(e) => {
                warn!(%namespace, error = %e, "can't read the deployment record");
                None
            }
        };
        let release = release_of(record.as_ref());
        let state = DeploymentState::from_running(self.resources.is_running(namespace, release).await?);

        let details = if options.details {
            Some(StatusDetails {
                release: self.releases.status(namespace, release).await?,
                pods: self.resources.pods(namespace).await?,
            })
        } else {
            None
        };

        let or_unknown = |v: Option<&String>| v.cloned().unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        Ok(Some(StatusReport {
            name: namespace.to_string(),
            state,
            version: or_unknown(record.as_ref().and_then(|r| r.application_version.as_ref())),
            worker_version: or_unknown(record.as_ref().and_then(|r| r.worker_version.as_ref())),
            project_path: record.and_then(|r| r.project_path),
            details,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn project_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = validate_project_path(&missing).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn project_path_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("domain.yml");
        std::fs::write(&file, "intents: []").unwrap();
        let err = validate_project_path(&file).await.unwrap_err();
        assert!(matches!(err, RasactlError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn project_path_is_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = validate_project_path(dir.path()).await.unwrap();
        assert!(path.is_absolute());
        assert_eq!(path, dir.path().canonicalize().unwrap());
    }
}
