//! rasactl-core — shared building blocks for rasactl.
//!
//! Everything the orchestration driver and its collaborators agree on
//! lives here: the persisted [`DeploymentRecord`], the error taxonomy,
//! naming rules for namespaces and derived cluster objects, the TOML
//! configuration, the external tool runner, and the async traits each
//! collaborator crate implements.

pub mod backend;
pub mod config;
pub mod error;
pub mod exec;
pub mod naming;
pub mod types;

pub use backend::{NodeManager, ReadinessProber, ReleaseManager, ResourceManager, StateStore};
pub use config::RasactlConfig;
pub use error::{RasactlError, RasactlResult};
pub use types::*;
