//! rasactl-helm — the release manager.
//!
//! Installs, upgrades and removes the Rasa X chart with the helm CLI.
//! Deployment-specific settings (initial password, ingress host, project
//! volume and node pinning) are rendered into a generated values file
//! layered after any user-supplied one.

pub mod release;
pub mod values;

pub use release::HelmReleaseManager;
