//! What the operations report back to the caller.

use std::path::PathBuf;

use rasactl_core::types::UNKNOWN_VERSION;
use rasactl_core::{DeploymentRecord, Endpoint, PodSummary, ReleaseInfo, VersionInfo};

use crate::teardown::TeardownReport;

/// Which branch `start` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPath {
    Installed,
    Resumed,
    AlreadyRunning,
}

/// Shown once after a first-time install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub url: String,
    pub version: VersionInfo,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub path: StartPath,
    pub endpoint: Endpoint,
    pub version: VersionInfo,
    /// Present only when `path` is `Installed`.
    pub summary: Option<InstallSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub endpoint: Endpoint,
    pub version: VersionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The namespace does not exist; nothing was done.
    NotFound,
    Deleted(TeardownReport),
}

/// Whether the release's workloads are scaled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Running,
    Stopped,
}

impl DeploymentState {
    pub fn from_running(running: bool) -> Self {
        if running {
            DeploymentState::Running
        } else {
            DeploymentState::Stopped
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeploymentState::Running => "Running",
            DeploymentState::Stopped => "Stopped",
        }
    }
}

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// The namespace the caller is working in.
    pub current: bool,
    pub name: String,
    pub state: DeploymentState,
    pub production: String,
    pub worker: String,
    pub enterprise: bool,
    pub version: String,
}

impl ListRow {
    /// Row from live version metadata.
    pub fn live(name: &str, current: bool, state: DeploymentState, version: &VersionInfo) -> Self {
        Self {
            current,
            name: name.to_string(),
            state,
            production: version.production.clone(),
            worker: version.worker.clone(),
            enterprise: version.enterprise,
            version: version.rasa_x.clone(),
        }
    }

    /// Row from the persisted record, with placeholders for anything
    /// never recorded. The production version is never persisted.
    pub fn recorded(
        name: &str,
        current: bool,
        state: DeploymentState,
        record: Option<&DeploymentRecord>,
    ) -> Self {
        let or_unknown = |v: Option<&String>| {
            v.cloned().unwrap_or_else(|| UNKNOWN_VERSION.to_string())
        };
        Self {
            current,
            name: name.to_string(),
            state,
            production: UNKNOWN_VERSION.to_string(),
            worker: or_unknown(record.and_then(|r| r.worker_version.as_ref())),
            enterprise: record.is_some_and(|r| r.enterprise),
            version: or_unknown(record.and_then(|r| r.application_version.as_ref())),
        }
    }
}

/// Release and pod details for `status --details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDetails {
    pub release: ReleaseInfo,
    pub pods: Vec<PodSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub name: String,
    pub state: DeploymentState,
    pub version: String,
    pub worker_version: String,
    pub project_path: Option<PathBuf>,
    pub details: Option<StatusDetails>,
}
