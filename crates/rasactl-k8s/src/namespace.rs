//! Namespace lifecycle and the ownership label.

use serde_json::Value;
use tracing::{debug, info};

use rasactl_core::RasactlResult;
use rasactl_core::exec::is_already_exists;
use rasactl_core::naming::OWNERSHIP_LABEL;

use crate::kubectl::{items, object_name};
use crate::manager::KubernetesManager;

/// Whether a namespace object carries the ownership label.
pub fn has_ownership_label(namespace: &Value) -> bool {
    namespace
        .pointer("/metadata/labels")
        .and_then(|labels| labels.get(OWNERSHIP_LABEL))
        .and_then(Value::as_str)
        == Some("true")
}

impl KubernetesManager {
    pub(crate) async fn namespace_object(&self, namespace: &str) -> RasactlResult<Option<Value>> {
        self.kubectl.get_optional(&["namespace", namespace]).await
    }

    pub(crate) async fn namespace_is_managed(&self, namespace: &str) -> RasactlResult<bool> {
        Ok(self
            .namespace_object(namespace)
            .await?
            .is_some_and(|ns| has_ownership_label(&ns)))
    }

    pub(crate) async fn create_namespace(&self, namespace: &str) -> RasactlResult<()> {
        match self.kubectl.run(&["create", "namespace", namespace]).await {
            Ok(_) => {
                info!(%namespace, "created namespace");
                Ok(())
            }
            Err(e) if is_already_exists(&e) => {
                debug!(%namespace, "namespace already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn delete_namespace(&self, namespace: &str) -> RasactlResult<()> {
        self.kubectl
            .run(&["delete", "namespace", namespace, "--ignore-not-found"])
            .await?;
        info!(%namespace, "deleted namespace");
        Ok(())
    }

    pub(crate) async fn label_namespace(&self, namespace: &str) -> RasactlResult<()> {
        let label = format!("{OWNERSHIP_LABEL}=true");
        self.kubectl
            .run(&["label", "namespace", namespace, &label, "--overwrite"])
            .await
            .map(|_| ())
    }

    pub(crate) async fn unlabel_namespace(&self, namespace: &str) -> RasactlResult<()> {
        let label = format!("{OWNERSHIP_LABEL}-");
        match self.kubectl.run(&["label", "namespace", namespace, &label]).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other.map(|_| ()),
        }
    }

    pub(crate) async fn managed_namespaces(&self) -> RasactlResult<Vec<String>> {
        let selector = format!("{OWNERSHIP_LABEL}=true");
        let list = self.kubectl.get_json(&["namespaces", "-l", &selector]).await?;
        Ok(items(&list)
            .iter()
            .filter_map(object_name)
            .map(str::to_string)
            .collect())
    }
}
