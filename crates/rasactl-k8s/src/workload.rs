//! Release workloads and pods.
//!
//! Stopping a deployment scales every deployment and statefulset of the
//! release to zero, remembering the previous replica count in an
//! annotation; starting restores it.

use serde_json::Value;
use tracing::{debug, info};

use rasactl_core::{PodSummary, RasactlResult};

use crate::kubectl::{items, object_name};
use crate::manager::KubernetesManager;

/// Annotation holding the replica count before scale-down.
pub const REPLICAS_ANNOTATION: &str = "rasactl/replicas";

const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// A scalable object of the release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    /// Lower-case kind, usable as a kubectl resource type.
    pub kind: String,
    pub name: String,
    pub replicas: i64,
    /// Replica count saved by the last scale-down.
    pub saved_replicas: Option<i64>,
}

impl Workload {
    pub fn resource(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }

    /// Replica count to restore on scale-up.
    pub fn restore_count(&self) -> i64 {
        self.saved_replicas.filter(|n| *n > 0).unwrap_or(1)
    }
}

pub fn parse_workloads(list: &Value) -> Vec<Workload> {
    items(list)
        .iter()
        .filter_map(|obj| {
            let kind = obj.get("kind")?.as_str()?.to_ascii_lowercase();
            let name = object_name(obj)?.to_string();
            let replicas = obj
                .pointer("/spec/replicas")
                .and_then(Value::as_i64)
                .unwrap_or(1);
            let saved_replicas = obj
                .pointer("/metadata/annotations")
                .and_then(|a| a.get(REPLICAS_ANNOTATION))
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok());
            Some(Workload {
                kind,
                name,
                replicas,
                saved_replicas,
            })
        })
        .collect()
}

/// Condition summary for one pod: "Ready" when every condition holds,
/// otherwise the reason (or type) of the first one that does not.
pub fn pod_condition(pod: &Value) -> String {
    let conditions = pod
        .pointer("/status/conditions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if conditions.is_empty() {
        return "Unknown".to_string();
    }
    let failing = conditions
        .iter()
        .find(|c| c.get("status").and_then(Value::as_str) != Some("True"));
    match failing {
        None => "Ready".to_string(),
        Some(c) => c
            .get("reason")
            .or_else(|| c.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
    }
}

pub fn parse_pods(list: &Value) -> Vec<PodSummary> {
    items(list)
        .iter()
        .filter_map(|pod| {
            Some(PodSummary {
                name: object_name(pod)?.to_string(),
                condition: pod_condition(pod),
                phase: pod
                    .pointer("/status/phase")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
            })
        })
        .collect()
}

impl KubernetesManager {
    pub(crate) async fn workloads(&self, namespace: &str, release: &str) -> RasactlResult<Vec<Workload>> {
        let selector = format!("{INSTANCE_LABEL}={release}");
        let list = self
            .kubectl
            .get_json(&[
                "deployments,statefulsets",
                "--namespace",
                namespace,
                "-l",
                &selector,
            ])
            .await?;
        Ok(parse_workloads(&list))
    }

    pub(crate) async fn scale_workloads_down(&self, namespace: &str, release: &str) -> RasactlResult<()> {
        for workload in self.workloads(namespace, release).await? {
            if workload.replicas == 0 {
                continue;
            }
            let resource = workload.resource();
            let saved = format!("{REPLICAS_ANNOTATION}={}", workload.replicas);
            self.kubectl
                .run(&["annotate", &resource, &saved, "--overwrite", "--namespace", namespace])
                .await?;
            self.kubectl
                .run(&["scale", &resource, "--replicas=0", "--namespace", namespace])
                .await?;
            debug!(%namespace, %resource, from = workload.replicas, "scaled down");
        }
        info!(%namespace, %release, "workloads scaled down");
        Ok(())
    }

    pub(crate) async fn scale_workloads_up(&self, namespace: &str, release: &str) -> RasactlResult<()> {
        for workload in self.workloads(namespace, release).await? {
            if workload.replicas > 0 {
                continue;
            }
            let resource = workload.resource();
            let replicas = format!("--replicas={}", workload.restore_count());
            self.kubectl
                .run(&["scale", &resource, &replicas, "--namespace", namespace])
                .await?;
            debug!(%namespace, %resource, to = workload.restore_count(), "scaled up");
        }
        info!(%namespace, %release, "workloads scaled up");
        Ok(())
    }

    pub(crate) async fn pod_summaries(&self, namespace: &str) -> RasactlResult<Vec<PodSummary>> {
        let list = self.kubectl.get_json(&["pods", "--namespace", namespace]).await?;
        Ok(parse_pods(&list))
    }
}
