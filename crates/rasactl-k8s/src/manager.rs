//! KubernetesManager — `ResourceManager` over kubectl.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use rasactl_core::config::RasactlConfig;
use rasactl_core::naming::local_hostname;
use rasactl_core::{BackendInfo, Endpoint, PodSummary, RasactlResult, ResourceManager};

use crate::backend;
use crate::hosts::HostsFile;
use crate::kubectl::Kubectl;

pub struct KubernetesManager {
    pub(crate) kubectl: Kubectl,
    pub(crate) backend: BackendInfo,
    pub(crate) hosts: HostsFile,
    pub(crate) domain: String,
}

impl KubernetesManager {
    /// Build a manager for an already detected backend.
    pub fn new(kubectl: Kubectl, backend: BackendInfo, hosts: HostsFile, domain: &str) -> Self {
        Self {
            kubectl,
            backend,
            hosts,
            domain: domain.to_string(),
        }
    }

    /// Build a manager from configuration, detecting the backend.
    pub async fn connect(config: &RasactlConfig) -> RasactlResult<Self> {
        let kubectl = Kubectl::new(
            &config.kubernetes.kubectl,
            config.kubernetes.context.as_deref(),
        );
        let backend = backend::detect(&kubectl).await?;
        let hosts = HostsFile::new(&config.hosts.file, &config.hosts.address);
        Ok(Self::new(kubectl, backend, hosts, &config.hosts.domain))
    }

    pub fn kubectl(&self) -> &Kubectl {
        &self.kubectl
    }

    pub fn hosts(&self) -> &HostsFile {
        &self.hosts
    }

    /// Local hostname of a namespace when hostname routing is in use.
    pub fn hostname(&self, namespace: &str) -> Option<String> {
        self.backend
            .routes_local_hostnames()
            .then(|| local_hostname(namespace, &self.domain))
    }
}

#[async_trait]
impl ResourceManager for KubernetesManager {
    fn backend(&self) -> &BackendInfo {
        &self.backend
    }

    async fn exists(&self, namespace: &str) -> RasactlResult<bool> {
        Ok(self.namespace_object(namespace).await?.is_some())
    }

    async fn is_managed(&self, namespace: &str) -> RasactlResult<bool> {
        self.namespace_is_managed(namespace).await
    }

    async fn create(&self, namespace: &str) -> RasactlResult<()> {
        self.create_namespace(namespace).await
    }

    async fn delete(&self, namespace: &str) -> RasactlResult<()> {
        self.delete_namespace(namespace).await
    }

    async fn add_label(&self, namespace: &str) -> RasactlResult<()> {
        self.label_namespace(namespace).await
    }

    async fn delete_label(&self, namespace: &str) -> RasactlResult<()> {
        self.unlabel_namespace(namespace).await
    }

    async fn list_managed(&self) -> RasactlResult<Vec<String>> {
        self.managed_namespaces().await
    }

    async fn is_running(&self, namespace: &str, release: &str) -> RasactlResult<bool> {
        let workloads = self.workloads(namespace, release).await?;
        Ok(workloads.iter().any(|w| w.replicas > 0))
    }

    async fn scale_up(&self, namespace: &str, release: &str) -> RasactlResult<()> {
        self.scale_workloads_up(namespace, release).await
    }

    async fn scale_down(&self, namespace: &str, release: &str) -> RasactlResult<()> {
        self.scale_workloads_down(namespace, release).await
    }

    async fn create_volume(&self, namespace: &str, host_path: &Path) -> RasactlResult<String> {
        self.create_project_volume(namespace, host_path).await
    }

    async fn delete_volume(&self, namespace: &str) -> RasactlResult<()> {
        self.delete_project_volume(namespace).await
    }

    async fn delete_node(&self, node: &str) -> RasactlResult<()> {
        debug!(%node, "deleting node object");
        self.kubectl
            .run(&["delete", "node", node, "--ignore-not-found"])
            .await
            .map(|_| ())
    }

    async fn resolve_endpoint(&self, namespace: &str, release: &str) -> RasactlResult<Endpoint> {
        let url = match self.hostname(namespace) {
            Some(host) => format!("http://{host}"),
            None => self.service_url(namespace, release).await?,
        };
        let token = self.access_token(namespace, release).await?;
        Ok(Endpoint { url, token })
    }

    async fn pods(&self, namespace: &str) -> RasactlResult<Vec<PodSummary>> {
        self.pod_summaries(namespace).await
    }

    async fn add_host_entry(&self, namespace: &str) -> RasactlResult<()> {
        match self.hostname(namespace) {
            Some(host) => self.hosts.add(&host),
            None => Ok(()),
        }
    }

    async fn remove_host_entry(&self, namespace: &str) -> RasactlResult<()> {
        match self.hostname(namespace) {
            Some(host) => self.hosts.remove(&host),
            None => Ok(()),
        }
    }
}
