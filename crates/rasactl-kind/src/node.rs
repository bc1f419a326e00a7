//! KindNodeManager — `NodeManager` over the docker CLI.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use rasactl_core::exec::Tool;
use rasactl_core::naming::node_name;
use rasactl_core::{BackendInfo, BackendKind, NodeManager, RasactlError, RasactlResult};

use crate::docker::{control_plane_name, join_args, parse_control_plane, run_args};

/// Attempts at the kubeadm join while the new node's container runtime
/// comes up.
const JOIN_ATTEMPTS: u32 = 30;
const JOIN_RETRY_INTERVAL: Duration = Duration::from_secs(2);

pub struct KindNodeManager {
    docker: Tool,
    /// kind cluster name; `None` when the backend is not kind.
    cluster: Option<String>,
}

impl KindNodeManager {
    pub fn new(docker_binary: &str, cluster: Option<&str>) -> Self {
        Self::with_tool(Tool::new(docker_binary), cluster)
    }

    fn with_tool(docker: Tool, cluster: Option<&str>) -> Self {
        Self {
            docker,
            cluster: cluster.map(str::to_string),
        }
    }

    /// Manager matching a detected backend.
    pub fn for_backend(docker_binary: &str, backend: &BackendInfo) -> Self {
        let cluster = match &backend.kind {
            BackendKind::Kind { cluster } => Some(cluster.as_str()),
            BackendKind::Remote => None,
        };
        Self::new(docker_binary, cluster)
    }

    fn cluster(&self) -> RasactlResult<&str> {
        self.cluster.as_deref().ok_or_else(|| {
            RasactlError::UnsupportedConfiguration(
                "local nodes require a kind cluster as the current context".to_string(),
            )
        })
    }

    async fn exists(&self, container: &str) -> RasactlResult<bool> {
        match self.docker.run(&["inspect", "--type", "container", container]).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn join(&self, cluster: &str, container: &str) -> RasactlResult<()> {
        let control_plane = control_plane_name(cluster);
        let join_command = self
            .docker
            .run(&[
                "exec",
                &control_plane,
                "kubeadm",
                "token",
                "create",
                "--print-join-command",
            ])
            .await?;
        let join = join_args(&join_command)?;

        let mut args: Vec<&str> = vec!["exec", container];
        args.extend(join.iter().map(String::as_str));

        let mut attempt = 1;
        loop {
            match self.docker.run(&args).await {
                Ok(_) => {
                    info!(node = %container, %cluster, "node joined the cluster");
                    return Ok(());
                }
                Err(e) if attempt < JOIN_ATTEMPTS => {
                    debug!(node = %container, attempt, error = %e, "join failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(JOIN_RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl NodeManager for KindNodeManager {
    fn supports_local_nodes(&self) -> bool {
        self.cluster.is_some()
    }

    async fn create_and_join(&self, namespace: &str, project_path: &Path) -> RasactlResult<()> {
        let cluster = self.cluster()?;
        let name = node_name(namespace);

        if self.exists(&name).await? {
            warn!(node = %name, "node already exists, starting it");
            return self.start(namespace).await;
        }

        let inspect = self
            .docker
            .run_json(&["inspect", "--type", "container", &control_plane_name(cluster)])
            .await?;
        let control_plane = parse_control_plane(&inspect)?;

        let args = run_args(&name, cluster, &control_plane, project_path);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.docker.run(&args).await?;
        info!(node = %name, image = %control_plane.image, path = %project_path.display(), "created node");

        self.join(cluster, &name).await
    }

    async fn start(&self, namespace: &str) -> RasactlResult<()> {
        let name = node_name(namespace);
        self.docker.run(&["start", &name]).await?;
        info!(node = %name, "started node");
        Ok(())
    }

    async fn stop(&self, namespace: &str) -> RasactlResult<()> {
        let name = node_name(namespace);
        match self.docker.run(&["stop", &name]).await {
            Ok(_) => {
                info!(node = %name, "stopped node");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(node = %name, "node already gone, nothing to stop");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, namespace: &str) -> RasactlResult<()> {
        let name = node_name(namespace);
        match self.docker.run(&["rm", "--force", &name]).await {
            Ok(_) => {
                info!(node = %name, "deleted node");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(node = %name, "node already gone");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
