//! Collaborator traits the orchestration driver is written against.
//!
//! Each trait is implemented by one crate (`rasactl-state`, `rasactl-k8s`,
//! `rasactl-kind`, `rasactl-helm`, `rasactl-health`) and injected into the
//! driver, which keeps the driver testable with in-memory fakes.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{RasactlError, RasactlResult};
use crate::types::*;

/// Durable per-namespace storage for the [`DeploymentRecord`].
///
/// Writes replace the whole record; callers read-modify-write.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Create or replace the record.
    async fn write(&self, namespace: &str, record: &DeploymentRecord) -> RasactlResult<()>;

    /// Read the record; `NotFound` when none was written.
    async fn read(&self, namespace: &str) -> RasactlResult<DeploymentRecord>;

    /// Remove the record. Removing a missing record succeeds.
    async fn delete(&self, namespace: &str) -> RasactlResult<()>;

    /// Read the record, mapping `NotFound` to `None`.
    async fn read_optional(&self, namespace: &str) -> RasactlResult<Option<DeploymentRecord>> {
        match self.read(namespace).await {
            Ok(record) => Ok(Some(record)),
            Err(RasactlError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Namespaces, volumes, workloads and routing inside the cluster.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Backend kind and host environment; fixed for the process lifetime.
    fn backend(&self) -> &BackendInfo;

    async fn exists(&self, namespace: &str) -> RasactlResult<bool>;

    /// Whether the namespace carries the ownership label.
    async fn is_managed(&self, namespace: &str) -> RasactlResult<bool>;

    /// Create the namespace; an existing namespace is success.
    async fn create(&self, namespace: &str) -> RasactlResult<()>;

    async fn delete(&self, namespace: &str) -> RasactlResult<()>;

    async fn add_label(&self, namespace: &str) -> RasactlResult<()>;

    async fn delete_label(&self, namespace: &str) -> RasactlResult<()>;

    /// All namespaces carrying the ownership label, in backend order.
    async fn list_managed(&self) -> RasactlResult<Vec<String>>;

    /// Whether any workload of the release has a non-zero replica count.
    async fn is_running(&self, namespace: &str, release: &str) -> RasactlResult<bool>;

    async fn scale_up(&self, namespace: &str, release: &str) -> RasactlResult<()>;

    async fn scale_down(&self, namespace: &str, release: &str) -> RasactlResult<()>;

    /// Create the volume and claim for a host path; returns the claim name.
    async fn create_volume(&self, namespace: &str, host_path: &Path) -> RasactlResult<String>;

    async fn delete_volume(&self, namespace: &str) -> RasactlResult<()>;

    /// Remove a node object from the cluster.
    async fn delete_node(&self, node: &str) -> RasactlResult<()>;

    /// Externally reachable URL and access token of the application.
    async fn resolve_endpoint(&self, namespace: &str, release: &str) -> RasactlResult<Endpoint>;

    async fn pods(&self, namespace: &str) -> RasactlResult<Vec<PodSummary>>;

    /// Route the namespace's local hostname to this host.
    async fn add_host_entry(&self, namespace: &str) -> RasactlResult<()>;

    async fn remove_host_entry(&self, namespace: &str) -> RasactlResult<()>;
}

/// Local single-node cluster instances joined to a kind cluster.
///
/// Only called when [`NodeManager::supports_local_nodes`] is true.
#[async_trait]
pub trait NodeManager: Send + Sync {
    fn supports_local_nodes(&self) -> bool;

    /// Create the node with the project mounted and join it to the cluster.
    async fn create_and_join(&self, namespace: &str, project_path: &Path) -> RasactlResult<()>;

    async fn start(&self, namespace: &str) -> RasactlResult<()>;

    async fn stop(&self, namespace: &str) -> RasactlResult<()>;

    async fn delete(&self, namespace: &str) -> RasactlResult<()>;
}

/// The templated application package installed into a namespace.
#[async_trait]
pub trait ReleaseManager: Send + Sync {
    async fn is_deployed(&self, namespace: &str, release: &str) -> RasactlResult<bool>;

    async fn install(&self, spec: &ReleaseSpec) -> RasactlResult<()>;

    async fn upgrade(&self, spec: &ReleaseSpec) -> RasactlResult<()>;

    /// Uninstalling a missing release succeeds.
    async fn uninstall(&self, namespace: &str, release: &str) -> RasactlResult<()>;

    async fn status(&self, namespace: &str, release: &str) -> RasactlResult<ReleaseInfo>;

    /// Computed values of the release.
    async fn values(&self, namespace: &str, release: &str) -> RasactlResult<serde_json::Value>;
}

/// HTTP readiness and metadata checks against the running application.
#[async_trait]
pub trait ReadinessProber: Send + Sync {
    /// Block until the application answers healthy or `timeout` elapses.
    async fn wait_for_ready(&self, url: &str, timeout: Duration) -> RasactlResult<()>;

    async fn version(&self, url: &str, token: Option<&str>) -> RasactlResult<VersionInfo>;
}
