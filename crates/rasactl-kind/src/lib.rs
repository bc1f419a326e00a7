//! rasactl-kind — local nodes for a kind cluster.
//!
//! A project deployment on kind gets its own node: a container cloned
//! from the cluster's control plane (same image, same network) with the
//! project directory mounted at the same path, joined to the cluster
//! with `kubeadm join`. The application is pinned to that node so the
//! host-path volume sees the project files.
//!
//! Nodes are named `kind-<namespace>`. On any other backend
//! [`KindNodeManager::supports_local_nodes`] is false and the driver
//! never calls into it.

pub mod docker;
pub mod node;

pub use node::KindNodeManager;
