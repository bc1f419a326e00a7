//! The project volume: a host-path volume plus a claim bound to it.

use std::path::Path;

use serde_json::{Value, json};
use tracing::{debug, info};

use rasactl_core::RasactlResult;
use rasactl_core::naming::{OWNERSHIP_ANNOTATION, claim_name, volume_name};

use crate::manager::KubernetesManager;

pub const VOLUME_CAPACITY: &str = "2Gi";
pub const STORAGE_CLASS: &str = "standard";

pub fn volume_manifest(namespace: &str, host_path: &Path) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "PersistentVolume",
        "metadata": {
            "name": volume_name(namespace),
            "annotations": { OWNERSHIP_ANNOTATION: "true" },
        },
        "spec": {
            "storageClassName": STORAGE_CLASS,
            "accessModes": ["ReadWriteOnce"],
            "capacity": { "storage": VOLUME_CAPACITY },
            "hostPath": { "path": host_path.to_string_lossy() },
        },
    })
}

/// Claim bound to the namespace's volume, sized to match it.
pub fn claim_manifest(namespace: &str, capacity: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "PersistentVolumeClaim",
        "metadata": {
            "name": claim_name(namespace),
            "namespace": namespace,
            "annotations": { OWNERSHIP_ANNOTATION: "true" },
        },
        "spec": {
            "storageClassName": STORAGE_CLASS,
            "accessModes": ["ReadWriteOnce"],
            "volumeName": volume_name(namespace),
            "resources": { "requests": { "storage": capacity } },
        },
    })
}

/// `spec.capacity.storage` of a volume object.
pub fn volume_capacity(volume: &Value) -> Option<&str> {
    volume.pointer("/spec/capacity/storage").and_then(Value::as_str)
}

impl KubernetesManager {
    pub(crate) async fn create_project_volume(
        &self,
        namespace: &str,
        host_path: &Path,
    ) -> RasactlResult<String> {
        let volume = match self.kubectl.create(&volume_manifest(namespace, host_path)).await? {
            Some(created) => {
                info!(%namespace, path = %host_path.display(), "created project volume");
                created
            }
            None => {
                debug!(%namespace, "project volume already exists");
                self.kubectl
                    .get_json(&["persistentvolume", &volume_name(namespace)])
                    .await?
            }
        };
        let capacity = volume_capacity(&volume).unwrap_or(VOLUME_CAPACITY);

        if self.kubectl.create(&claim_manifest(namespace, capacity)).await?.is_none() {
            debug!(%namespace, "project volume claim already exists");
        }
        Ok(claim_name(namespace))
    }

    pub(crate) async fn delete_project_volume(&self, namespace: &str) -> RasactlResult<()> {
        let claim = claim_name(namespace);
        self.kubectl
            .run(&[
                "delete",
                "persistentvolumeclaim",
                &claim,
                "--namespace",
                namespace,
                "--ignore-not-found",
            ])
            .await?;
        let volume = volume_name(namespace);
        self.kubectl
            .run(&["delete", "persistentvolume", &volume, "--ignore-not-found"])
            .await?;
        info!(%namespace, "deleted project volume");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_points_at_host_path() {
        let manifest = volume_manifest("demo", Path::new("/home/me/project"));
        assert_eq!(manifest["metadata"]["name"], "rasactl-pv-demo");
        assert_eq!(manifest["metadata"]["annotations"]["rasactl"], "true");
        assert_eq!(manifest["spec"]["hostPath"]["path"], "/home/me/project");
        assert_eq!(volume_capacity(&manifest), Some("2Gi"));
    }

    #[test]
    fn claim_binds_to_namespace_volume() {
        let manifest = claim_manifest("demo", "5Gi");
        assert_eq!(manifest["metadata"]["name"], "rasactl-pvc-demo");
        assert_eq!(manifest["metadata"]["namespace"], "demo");
        assert_eq!(manifest["spec"]["volumeName"], "rasactl-pv-demo");
        assert_eq!(manifest["spec"]["resources"]["requests"]["storage"], "5Gi");
    }
}
