//! SecretStateStore — the deployment record as a Kubernetes secret.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use rasactl_core::exec::Tool;
use rasactl_core::naming::{OWNERSHIP_LABEL, STATE_SECRET_NAME};
use rasactl_core::{DeploymentRecord, RasactlError, RasactlResult, StateStore};

use crate::record::{decode_secret_data, from_string_data, to_string_data};

/// State store writing one secret per namespace through kubectl.
#[derive(Debug, Clone)]
pub struct SecretStateStore {
    kubectl: Tool,
}

impl SecretStateStore {
    pub fn new(kubectl: Tool) -> Self {
        Self { kubectl }
    }

    /// The manifest applied on every write.
    pub fn manifest(namespace: &str, record: &DeploymentRecord) -> serde_json::Value {
        json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "type": "Opaque",
            "metadata": {
                "name": STATE_SECRET_NAME,
                "namespace": namespace,
                "labels": { OWNERSHIP_LABEL: "true" },
            },
            "stringData": to_string_data(record),
        })
    }
}

fn persistence(err: RasactlError) -> RasactlError {
    match err {
        RasactlError::NotFound(_) | RasactlError::Persistence(_) => err,
        other => RasactlError::Persistence(other.to_string()),
    }
}

#[async_trait]
impl StateStore for SecretStateStore {
    async fn write(&self, namespace: &str, record: &DeploymentRecord) -> RasactlResult<()> {
        let manifest = serde_json::to_vec(&Self::manifest(namespace, record))
            .map_err(|e| RasactlError::Persistence(e.to_string()))?;
        self.kubectl
            .run_with_stdin(&["apply", "--namespace", namespace, "-f", "-"], &manifest)
            .await
            .map_err(|e| match e {
                // A missing namespace is a write failure, not an absent record.
                RasactlError::NotFound(msg) => RasactlError::Persistence(msg),
                other => persistence(other),
            })?;
        debug!(%namespace, release = %record.release_name, "deployment record stored");
        Ok(())
    }

    async fn read(&self, namespace: &str) -> RasactlResult<DeploymentRecord> {
        let secret = self
            .kubectl
            .run_json(&[
                "get",
                "secret",
                STATE_SECRET_NAME,
                "--namespace",
                namespace,
                "-o",
                "json",
            ])
            .await
            .map_err(persistence)?;
        let data = decode_secret_data(&secret)?;
        from_string_data(&data)
    }

    async fn delete(&self, namespace: &str) -> RasactlResult<()> {
        self.kubectl
            .run(&[
                "delete",
                "secret",
                STATE_SECRET_NAME,
                "--namespace",
                namespace,
                "--ignore-not-found",
            ])
            .await
            .map_err(persistence)?;
        debug!(%namespace, "deployment record deleted");
        Ok(())
    }
}
