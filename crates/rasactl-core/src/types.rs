//! Domain types shared across rasactl crates.
//!
//! These describe the persisted deployment record, what the cluster and
//! the running application report back, and the parameters handed to the
//! release manager.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default Helm release name for a deployment.
pub const DEFAULT_RELEASE_NAME: &str = "rasa-x";

/// Default initial password for the Rasa X admin user.
pub const DEFAULT_PASSWORD: &str = "rasaxlocal";

/// Placeholder shown for a version that was never recorded.
pub const UNKNOWN_VERSION: &str = "0.0.0";

// ── Deployment record ─────────────────────────────────────────────

/// Last-known configuration of a deployment, persisted per namespace.
///
/// Versions are `None` until the first successful readiness check
/// recorded them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub release_name: String,
    /// Host directory mounted into the local node, if any.
    pub project_path: Option<PathBuf>,
    pub application_version: Option<String>,
    pub worker_version: Option<String>,
    pub enterprise: bool,
}

impl DeploymentRecord {
    /// A fresh record written before the first install attempt.
    pub fn new(release_name: &str, project_path: Option<PathBuf>) -> Self {
        Self {
            release_name: release_name.to_string(),
            project_path,
            application_version: None,
            worker_version: None,
            enterprise: false,
        }
    }

    /// Copy version metadata reported by the running application.
    pub fn apply_version(&mut self, version: &VersionInfo) {
        self.application_version = Some(version.rasa_x.clone());
        self.worker_version = Some(version.worker.clone());
        self.enterprise = version.enterprise;
    }

    /// Whether this deployment was started with a mounted project directory.
    pub fn has_project(&self) -> bool {
        self.project_path.is_some()
    }
}

// ── Application metadata ──────────────────────────────────────────

/// Version and feature metadata reported by `/api/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Rasa production version ("0.0.0" when no production model runs).
    pub production: String,
    pub worker: String,
    pub rasa_x: String,
    pub enterprise: bool,
}

/// Externally reachable address of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub token: Option<String>,
}

// ── Backend capabilities ──────────────────────────────────────────

/// Kind of Kubernetes backend behind the current context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// A kind cluster; local nodes can be added to it.
    Kind { cluster: String },
    /// Any other cluster.
    Remote,
}

/// Cloud provider the tool itself is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudProvider {
    Aws,
    Gcp,
    Azure,
    Unknown,
}

impl CloudProvider {
    pub fn label(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Gcp => "gcp",
            CloudProvider::Azure => "azure",
            CloudProvider::Unknown => "unknown",
        }
    }
}

/// Detected backend plus the host environment it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub kind: BackendKind,
    pub cloud: CloudProvider,
}

impl BackendInfo {
    pub fn is_local(&self) -> bool {
        matches!(self.kind, BackendKind::Kind { .. })
    }

    /// Local hostnames resolve through the hosts file only on a kind
    /// backend running outside a recognized cloud.
    pub fn routes_local_hostnames(&self) -> bool {
        self.is_local() && self.cloud == CloudProvider::Unknown
    }
}

// ── Release ───────────────────────────────────────────────────────

/// Parameters for installing or upgrading the release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSpec {
    pub namespace: String,
    pub release_name: String,
    pub chart_version: Option<String>,
    pub values_file: Option<PathBuf>,
    /// Claim holding the mounted project directory.
    pub volume_claim: Option<String>,
    /// Node the application is pinned to when a project is mounted.
    pub node_name: Option<String>,
    /// Ingress host when local hostname routing is in use.
    pub hostname: Option<String>,
    /// Initial admin password; ignored when resuming.
    pub password: String,
    /// Restarting a stopped deployment: skip first-run initialization.
    pub resume: bool,
    pub atomic: bool,
    pub reuse_values: bool,
    pub timeout: Duration,
}

impl ReleaseSpec {
    pub fn new(namespace: &str, release_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            release_name: release_name.to_string(),
            chart_version: None,
            values_file: None,
            volume_claim: None,
            node_name: None,
            hostname: None,
            password: DEFAULT_PASSWORD.to_string(),
            resume: false,
            atomic: false,
            reuse_values: true,
            timeout: Duration::from_secs(600),
        }
    }
}

/// Where a release mounts the project and which node it is pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlacement {
    pub volume_claim: Option<String>,
    pub node_name: Option<String>,
}

impl ReleasePlacement {
    /// Placement of a deployment created with a project path.
    pub fn project(namespace: &str) -> Self {
        Self {
            volume_claim: Some(crate::naming::claim_name(namespace)),
            node_name: Some(crate::naming::node_name(namespace)),
        }
    }

    /// Read the placement back from a release's chart values; `None`
    /// when the release mounts no project and has no node selector.
    pub fn from_values(values: &serde_json::Value) -> Option<Self> {
        let rasax = values.get("rasax")?;
        let volume_claim = rasax
            .get("extraVolumes")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .find_map(|volume| volume.pointer("/persistentVolumeClaim/claimName")?.as_str())
            .map(str::to_string);
        let node_name = rasax
            .get("nodeSelector")
            .and_then(|s| s.get("kubernetes.io/hostname"))
            .and_then(|n| n.as_str())
            .map(str::to_string);

        (volume_claim.is_some() || node_name.is_some()).then_some(Self {
            volume_claim,
            node_name,
        })
    }

    pub fn apply(&self, spec: &mut ReleaseSpec) {
        spec.volume_claim.clone_from(&self.volume_claim);
        spec.node_name.clone_from(&self.node_name);
    }
}

/// Status of an installed release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub name: String,
    /// Helm status string: "deployed", "failed", "pending-upgrade", ...
    pub status: String,
    pub revision: u32,
    pub chart_name: String,
    pub chart_version: String,
}

impl ReleaseInfo {
    pub fn is_deployed(&self) -> bool {
        self.status == "deployed"
    }
}

// ── Workloads ─────────────────────────────────────────────────────

/// One pod of the deployment, as shown by `status --details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSummary {
    pub name: String,
    pub condition: String,
    pub phase: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_version_fills_record() {
        let mut record = DeploymentRecord::new("rasa-x", None);
        assert_eq!(record.application_version, None);

        record.apply_version(&VersionInfo {
            production: "2.8.1".to_string(),
            worker: "2.8.1".to_string(),
            rasa_x: "0.42.0".to_string(),
            enterprise: true,
        });

        assert_eq!(record.application_version.as_deref(), Some("0.42.0"));
        assert_eq!(record.worker_version.as_deref(), Some("2.8.1"));
        assert!(record.enterprise);
        assert_eq!(record.release_name, "rasa-x");
    }

    #[test]
    fn hostname_routing_requires_kind_without_cloud() {
        let kind = BackendKind::Kind {
            cluster: "rasa".to_string(),
        };
        let local = BackendInfo {
            kind: kind.clone(),
            cloud: CloudProvider::Unknown,
        };
        assert!(local.routes_local_hostnames());

        let on_gcp = BackendInfo {
            kind,
            cloud: CloudProvider::Gcp,
        };
        assert!(on_gcp.is_local());
        assert!(!on_gcp.routes_local_hostnames());

        let remote = BackendInfo {
            kind: BackendKind::Remote,
            cloud: CloudProvider::Unknown,
        };
        assert!(!remote.routes_local_hostnames());
    }

    #[test]
    fn placement_read_back_from_values() {
        let values = serde_json::json!({
            "rasax": {
                "extraVolumes": [
                    { "name": "cache", "emptyDir": {} },
                    { "name": "project", "persistentVolumeClaim": { "claimName": "rasactl-pvc-demo" } }
                ],
                "nodeSelector": { "kubernetes.io/hostname": "kind-demo" }
            },
            "ingress": { "enabled": true }
        });
        let placement = ReleasePlacement::from_values(&values).unwrap();
        assert_eq!(placement, ReleasePlacement::project("demo"));

        let mut spec = ReleaseSpec::new("demo", "rasa-x");
        placement.apply(&mut spec);
        assert_eq!(spec.volume_claim.as_deref(), Some("rasactl-pvc-demo"));
        assert_eq!(spec.node_name.as_deref(), Some("kind-demo"));
    }

    #[test]
    fn no_placement_without_project_values() {
        assert_eq!(ReleasePlacement::from_values(&serde_json::json!({})), None);
        let values = serde_json::json!({ "rasax": { "initialUser": { "password": "x" } } });
        assert_eq!(ReleasePlacement::from_values(&values), None);
    }
}
