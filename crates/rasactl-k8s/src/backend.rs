//! Backend detection.
//!
//! A context named `kind-<cluster>` points at a kind cluster; anything
//! else is treated as a remote cluster. The cloud provider is detected
//! by querying the instance metadata services, which only answer from
//! inside the respective cloud.

use std::time::Duration;

use tracing::debug;

use rasactl_core::{BackendInfo, BackendKind, CloudProvider, RasactlResult};
use rasactl_health::http;

use crate::kubectl::Kubectl;

const KIND_CONTEXT_PREFIX: &str = "kind-";

const AWS_METADATA_URL: &str = "http://169.254.169.254/latest/meta-data/instance-id";
const GCP_METADATA_URL: &str = "http://169.254.169.254/computeMetadata/v1/instance/id";
const AZURE_METADATA_URL: &str = "http://169.254.169.254/metadata/instance?api-version=2021-02-01";

/// Bound for each metadata request.
pub const METADATA_TIMEOUT: Duration = Duration::from_millis(500);

/// Backend kind for a kube context name.
pub fn backend_from_context(context: &str) -> BackendKind {
    match context.strip_prefix(KIND_CONTEXT_PREFIX) {
        Some(cluster) if !cluster.is_empty() => BackendKind::Kind {
            cluster: cluster.to_string(),
        },
        _ => BackendKind::Remote,
    }
}

/// Detect the backend behind the kubectl context.
pub async fn detect(kubectl: &Kubectl) -> RasactlResult<BackendInfo> {
    let context = kubectl.current_context().await?;
    let kind = backend_from_context(&context);
    let cloud = detect_cloud_provider(METADATA_TIMEOUT).await;
    debug!(%context, ?kind, cloud = cloud.label(), "detected backend");
    Ok(BackendInfo { kind, cloud })
}

/// Which cloud this host runs in, if any.
pub async fn detect_cloud_provider(timeout: Duration) -> CloudProvider {
    let (aws, gcp, azure) = tokio::join!(
        answers(AWS_METADATA_URL, &[], timeout),
        answers(GCP_METADATA_URL, &[("metadata-flavor", "Google")], timeout),
        answers(AZURE_METADATA_URL, &[("metadata", "true")], timeout),
    );
    if gcp {
        CloudProvider::Gcp
    } else if azure {
        CloudProvider::Azure
    } else if aws {
        CloudProvider::Aws
    } else {
        CloudProvider::Unknown
    }
}

async fn answers(url: &str, headers: &[(&str, &str)], timeout: Duration) -> bool {
    matches!(http::get(url, headers, timeout).await, Ok(resp) if resp.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_context_names_cluster() {
        assert_eq!(
            backend_from_context("kind-rasactl"),
            BackendKind::Kind {
                cluster: "rasactl".to_string()
            }
        );
    }

    #[test]
    fn other_contexts_are_remote() {
        assert_eq!(backend_from_context("gke_project_zone_cluster"), BackendKind::Remote);
        assert_eq!(backend_from_context("kind-"), BackendKind::Remote);
        assert_eq!(backend_from_context("minikube"), BackendKind::Remote);
    }
}
