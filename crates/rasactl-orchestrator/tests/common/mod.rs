//! In-memory cluster for driving the orchestrator in tests.
//!
//! One `FakeCluster` implements every collaborator trait except the
//! state store (tests use `MemoryStateStore`). Every call is appended to
//! a log so tests can assert order, and any call can be made to fail.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use rasactl_core::{
    BackendInfo, BackendKind, CloudProvider, Endpoint, NodeManager, PodSummary, RasactlError,
    RasactlResult, ReadinessProber, ReleaseInfo, ReleaseManager, ReleaseSpec, ResourceManager,
    VersionInfo,
};
use rasactl_orchestrator::Orchestrator;
use rasactl_state::memory::MemoryStateStore;

#[derive(Debug, Default)]
pub struct World {
    /// Namespace → carries the ownership label.
    pub namespaces: HashMap<String, bool>,
    pub deployed: HashSet<String>,
    pub running: HashSet<String>,
    pub volumes: HashSet<String>,
    /// Node → container running.
    pub nodes: HashMap<String, bool>,
    pub hosts: HashSet<String>,
    pub installs: Vec<ReleaseSpec>,
    pub upgrades: Vec<ReleaseSpec>,
    /// Chart values of each deployed release.
    pub release_values: HashMap<String, serde_json::Value>,
    pub calls: Vec<String>,
    pub failing: HashSet<&'static str>,
    pub never_ready: bool,
    pub version_unavailable: bool,
}

pub struct FakeCluster {
    pub world: Mutex<World>,
    backend: BackendInfo,
}

pub fn kind_backend() -> BackendInfo {
    BackendInfo {
        kind: BackendKind::Kind {
            cluster: "rasactl".to_string(),
        },
        cloud: CloudProvider::Unknown,
    }
}

pub fn remote_backend() -> BackendInfo {
    BackendInfo {
        kind: BackendKind::Remote,
        cloud: CloudProvider::Gcp,
    }
}

pub fn version() -> VersionInfo {
    VersionInfo {
        production: "2.8.1".to_string(),
        worker: "2.8.2".to_string(),
        rasa_x: "0.42.0".to_string(),
        enterprise: false,
    }
}

impl FakeCluster {
    pub fn new(backend: BackendInfo) -> Arc<Self> {
        Arc::new(Self {
            world: Mutex::new(World::default()),
            backend,
        })
    }

    pub fn fail(&self, op: &'static str) {
        self.world.lock().unwrap().failing.insert(op);
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world.lock().unwrap())
    }

    pub fn calls(&self) -> Vec<String> {
        self.world.lock().unwrap().calls.clone()
    }

    /// Operation names of every call, in order.
    pub fn ops(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.split_whitespace().next().unwrap_or_default().to_string())
            .collect()
    }

    pub fn called(&self, op: &str) -> bool {
        self.ops().iter().any(|o| o == op)
    }

    /// Log a call; fail it when requested.
    fn call(&self, op: &'static str, arg: &str) -> RasactlResult<()> {
        let mut world = self.world.lock().unwrap();
        world.calls.push(format!("{op} {arg}"));
        if world.failing.contains(op) {
            Err(RasactlError::BackendUnavailable(format!("{op} failed")))
        } else {
            Ok(())
        }
    }

    fn mutate<R>(&self, op: &'static str, arg: &str, f: impl FnOnce(&mut World) -> R) -> RasactlResult<R> {
        self.call(op, arg)?;
        Ok(f(&mut self.world.lock().unwrap()))
    }
}

#[async_trait]
impl ResourceManager for FakeCluster {
    fn backend(&self) -> &BackendInfo {
        &self.backend
    }

    async fn exists(&self, namespace: &str) -> RasactlResult<bool> {
        self.mutate("exists", namespace, |w| w.namespaces.contains_key(namespace))
    }

    async fn is_managed(&self, namespace: &str) -> RasactlResult<bool> {
        self.mutate("is_managed", namespace, |w| {
            w.namespaces.get(namespace).copied().unwrap_or(false)
        })
    }

    async fn create(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("create_namespace", namespace, |w| {
            w.namespaces.entry(namespace.to_string()).or_insert(false);
        })
    }

    async fn delete(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("delete_namespace", namespace, |w| {
            w.namespaces.remove(namespace);
        })
    }

    async fn add_label(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("add_label", namespace, |w| {
            w.namespaces.insert(namespace.to_string(), true);
        })
    }

    async fn delete_label(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("delete_label", namespace, |w| {
            if let Some(managed) = w.namespaces.get_mut(namespace) {
                *managed = false;
            }
        })
    }

    async fn list_managed(&self) -> RasactlResult<Vec<String>> {
        self.mutate("list_managed", "", |w| {
            let mut names: Vec<String> = w
                .namespaces
                .iter()
                .filter(|(_, managed)| **managed)
                .map(|(name, _)| name.clone())
                .collect();
            names.sort();
            names
        })
    }

    async fn is_running(&self, namespace: &str, _release: &str) -> RasactlResult<bool> {
        self.mutate("is_running", namespace, |w| w.running.contains(namespace))
    }

    async fn scale_up(&self, namespace: &str, _release: &str) -> RasactlResult<()> {
        self.mutate("scale_up", namespace, |w| {
            w.running.insert(namespace.to_string());
        })
    }

    async fn scale_down(&self, namespace: &str, _release: &str) -> RasactlResult<()> {
        self.mutate("scale_down", namespace, |w| {
            w.running.remove(namespace);
        })
    }

    async fn create_volume(&self, namespace: &str, _host_path: &Path) -> RasactlResult<String> {
        self.mutate("create_volume", namespace, |w| {
            w.volumes.insert(namespace.to_string());
            format!("rasactl-pvc-{namespace}")
        })
    }

    async fn delete_volume(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("delete_volume", namespace, |w| {
            w.volumes.remove(namespace);
        })
    }

    async fn delete_node(&self, node: &str) -> RasactlResult<()> {
        self.call("delete_node_object", node)
    }

    async fn resolve_endpoint(&self, namespace: &str, _release: &str) -> RasactlResult<Endpoint> {
        self.call("resolve_endpoint", namespace)?;
        Ok(Endpoint {
            url: format!("http://{namespace}.rasactl.local.io"),
            token: Some("token".to_string()),
        })
    }

    async fn pods(&self, namespace: &str) -> RasactlResult<Vec<PodSummary>> {
        self.call("pods", namespace)?;
        Ok(vec![PodSummary {
            name: "rasa-x-rasa-x-0".to_string(),
            condition: "Ready".to_string(),
            phase: "Running".to_string(),
        }])
    }

    async fn add_host_entry(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("add_host_entry", namespace, |w| {
            w.hosts.insert(namespace.to_string());
        })
    }

    async fn remove_host_entry(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("remove_host_entry", namespace, |w| {
            w.hosts.remove(namespace);
        })
    }
}

#[async_trait]
impl NodeManager for FakeCluster {
    fn supports_local_nodes(&self) -> bool {
        self.backend.is_local()
    }

    async fn create_and_join(&self, namespace: &str, _project_path: &Path) -> RasactlResult<()> {
        self.mutate("node_create", namespace, |w| {
            w.nodes.insert(format!("kind-{namespace}"), true);
        })
    }

    async fn start(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("node_start", namespace, |w| {
            w.nodes.insert(format!("kind-{namespace}"), true);
        })
    }

    async fn stop(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("node_stop", namespace, |w| {
            w.nodes.insert(format!("kind-{namespace}"), false);
        })
    }

    async fn delete(&self, namespace: &str) -> RasactlResult<()> {
        self.mutate("node_delete", namespace, |w| {
            w.nodes.remove(&format!("kind-{namespace}"));
        })
    }
}

#[async_trait]
impl ReleaseManager for FakeCluster {
    async fn is_deployed(&self, namespace: &str, _release: &str) -> RasactlResult<bool> {
        self.mutate("is_deployed", namespace, |w| w.deployed.contains(namespace))
    }

    async fn install(&self, spec: &ReleaseSpec) -> RasactlResult<()> {
        self.mutate("install", &spec.namespace, |w| {
            w.deployed.insert(spec.namespace.clone());
            w.running.insert(spec.namespace.clone());
            w.installs.push(spec.clone());
        })
    }

    async fn upgrade(&self, spec: &ReleaseSpec) -> RasactlResult<()> {
        self.mutate("upgrade", &spec.namespace, |w| {
            w.upgrades.push(spec.clone());
        })
    }

    async fn uninstall(&self, namespace: &str, _release: &str) -> RasactlResult<()> {
        self.mutate("uninstall", namespace, |w| {
            w.deployed.remove(namespace);
            w.running.remove(namespace);
        })
    }

    async fn status(&self, namespace: &str, release: &str) -> RasactlResult<ReleaseInfo> {
        self.call("release_status", namespace)?;
        Ok(ReleaseInfo {
            name: release.to_string(),
            status: "deployed".to_string(),
            revision: 1,
            chart_name: "rasa-x".to_string(),
            chart_version: "2.0.0".to_string(),
        })
    }

    async fn values(&self, namespace: &str, _release: &str) -> RasactlResult<serde_json::Value> {
        self.mutate("values", namespace, |w| {
            w.release_values
                .get(namespace)
                .cloned()
                .unwrap_or_else(|| serde_json::json!({}))
        })
    }
}

#[async_trait]
impl ReadinessProber for FakeCluster {
    async fn wait_for_ready(&self, url: &str, timeout: Duration) -> RasactlResult<()> {
        self.call("wait_for_ready", url)?;
        if self.world.lock().unwrap().never_ready {
            return Err(RasactlError::ReadinessTimeout {
                url: url.to_string(),
                timeout,
            });
        }
        Ok(())
    }

    async fn version(&self, url: &str, _token: Option<&str>) -> RasactlResult<VersionInfo> {
        self.call("version", url)?;
        if self.world.lock().unwrap().version_unavailable {
            return Err(RasactlError::Probe(format!("{url} unreachable")));
        }
        Ok(version())
    }
}

/// Orchestrator wired to one fake cluster and a memory store.
pub fn orchestrator(cluster: &Arc<FakeCluster>, store: &MemoryStateStore) -> Orchestrator {
    Orchestrator::new(
        cluster.clone(),
        cluster.clone(),
        cluster.clone(),
        Arc::new(store.clone()),
        cluster.clone(),
    )
}
