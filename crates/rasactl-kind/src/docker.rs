//! Docker invocations for kind node containers.

use std::path::Path;

use serde_json::Value;

use rasactl_core::{RasactlError, RasactlResult};

pub const CLUSTER_LABEL: &str = "io.x-k8s.kind.cluster";
pub const ROLE_LABEL: &str = "io.x-k8s.kind.role";
const DEFAULT_NETWORK: &str = "kind";

/// Control-plane container of a kind cluster.
pub fn control_plane_name(cluster: &str) -> String {
    format!("{cluster}-control-plane")
}

/// What a new node copies from the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlane {
    pub image: String,
    pub network: String,
}

/// Parse `docker inspect <control-plane>` output.
pub fn parse_control_plane(inspect: &Value) -> RasactlResult<ControlPlane> {
    let container = inspect
        .get(0)
        .ok_or_else(|| RasactlError::NotFound("kind control plane container".to_string()))?;
    let image = container
        .pointer("/Config/Image")
        .and_then(Value::as_str)
        .ok_or_else(|| RasactlError::Command {
            program: "docker".to_string(),
            message: "control plane container has no image".to_string(),
        })?
        .to_string();
    let network = container
        .pointer("/NetworkSettings/Networks")
        .and_then(Value::as_object)
        .and_then(|nets| nets.keys().next().cloned())
        .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
    Ok(ControlPlane { image, network })
}

/// `docker run` arguments for a worker node with the project mounted.
pub fn run_args(name: &str, cluster: &str, control_plane: &ControlPlane, project_path: &Path) -> Vec<String> {
    let project = project_path.to_string_lossy();
    let cluster_label = format!("{CLUSTER_LABEL}={cluster}");
    let role_label = format!("{ROLE_LABEL}=worker");
    let mount = format!("{project}:{project}");
    [
        "run",
        "--detach",
        "--privileged",
        "--name",
        name,
        "--hostname",
        name,
        "--network",
        control_plane.network.as_str(),
        "--label",
        cluster_label.as_str(),
        "--label",
        role_label.as_str(),
        "--label",
        "rasactl=true",
        "--restart",
        "on-failure:1",
        "--security-opt",
        "seccomp=unconfined",
        "--security-opt",
        "apparmor=unconfined",
        "--tmpfs",
        "/tmp",
        "--tmpfs",
        "/run",
        "--volume",
        "/var",
        "--volume",
        "/lib/modules:/lib/modules:ro",
        "--volume",
        mount.as_str(),
        control_plane.image.as_str(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Split the control plane's join command and make it tolerate the
/// preflight checks a container node cannot pass.
pub fn join_args(join_command: &str) -> RasactlResult<Vec<String>> {
    let mut args: Vec<String> = join_command.split_whitespace().map(str::to_string).collect();
    if args.first().map(String::as_str) != Some("kubeadm") {
        return Err(RasactlError::Command {
            program: "kubeadm".to_string(),
            message: format!("unexpected join command: {join_command}"),
        });
    }
    args.push("--ignore-preflight-errors=all".to_string());
    Ok(args)
}
