//! Per-namespace lifecycle state machine.
//!
//! ```text
//! Absent ──► Installing ──► Running ◄──► Stopped
//!                              │
//!                              ▼
//!                          Upgrading ──► Running | Inconsistent
//!
//! any ──► Deleting ──► Absent (prune) | Stopped (namespace kept)
//! ```

use rasactl_core::{RasactlError, RasactlResult};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No release in the namespace.
    Absent,
    Installing,
    Running,
    /// Release deployed, workloads scaled to zero.
    Stopped,
    /// Transient; ends in `Running` or `Inconsistent`.
    Upgrading,
    Deleting,
    /// A release operation failed part-way; no automatic rollback.
    Inconsistent,
}

impl Phase {
    /// Phase implied by the release and workload flags.
    pub fn observe(deployed: bool, running: bool) -> Self {
        match (deployed, running) {
            (_, true) => Phase::Running,
            (true, false) => Phase::Stopped,
            (false, false) => Phase::Absent,
        }
    }

    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        match (self, next) {
            (_, Deleting) => true,
            (Deleting, Absent | Stopped) => true,
            (Absent, Installing) => true,
            (Installing, Running | Inconsistent) => true,
            (Running, Stopped | Upgrading) => true,
            (Stopped, Running | Upgrading) => true,
            (Upgrading, Running | Inconsistent) => true,
            (Inconsistent, Installing | Upgrading) => true,
            (a, b) => a == b,
        }
    }

    /// Move to `next`, logging the transition.
    pub fn advance(self, namespace: &str, next: Phase) -> RasactlResult<Phase> {
        if !self.can_transition_to(next) {
            return Err(RasactlError::InvalidTransition {
                namespace: namespace.to_string(),
                from: format!("{self:?}"),
                to: format!("{next:?}"),
            });
        }
        info!(%namespace, from = ?self, to = ?next, "phase transition");
        Ok(next)
    }
}
