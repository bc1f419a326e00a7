//! rasactl-k8s — the namespace and resource manager.
//!
//! Drives kubectl to manage everything rasactl owns inside a cluster:
//! the namespace and its ownership label, the project volume, the
//! release's workloads, and the address the application is reachable
//! at. Also detects which backend the current context points to and
//! maintains hosts-file entries for local hostname routing.
//!
//! # Components
//!
//! - **`kubectl`** — thin JSON-speaking wrapper around the kubectl binary
//! - **`backend`** — kind vs. remote backend, cloud provider detection
//! - **`namespace`**, **`volumes`**, **`workload`**, **`endpoint`** — the
//!   operations, grouped by the objects they touch
//! - **`hosts`** — hosts-file editing
//! - **`manager`** — [`KubernetesManager`], the `ResourceManager` impl

pub mod backend;
pub mod endpoint;
pub mod hosts;
pub mod kubectl;
pub mod manager;
pub mod namespace;
pub mod volumes;
pub mod workload;

pub use hosts::HostsFile;
pub use kubectl::Kubectl;
pub use manager::KubernetesManager;
