//! rasactl-orchestrator — the deployment orchestration driver.
//!
//! Given the observed state of a namespace, decides which sequence of
//! cluster and host operations to run, persists the derived deployment
//! record, and confirms readiness before returning.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator
//!   ├── ResourceManager  (namespace, volume, workloads, endpoint, hosts)
//!   ├── NodeManager      (local kind node, when supported)
//!   ├── ReleaseManager   (chart install / upgrade / uninstall)
//!   ├── StateStore       (DeploymentRecord per namespace)
//!   └── ReadinessProber  (health wait, version metadata)
//! ```
//!
//! Every operation takes an explicit options struct and runs one
//! namespace's workflow to completion; steps are awaited in order.
//!
//! # Components
//!
//! - **`options`** — per-operation option structs
//! - **`outcome`** — what each operation reports back
//! - **`phase`** — the per-namespace lifecycle state machine
//! - **`teardown`** — error accumulator for delete (abort-on-first / best-effort)
//! - **`driver`** — [`Orchestrator`], the operations themselves

pub mod driver;
pub mod options;
pub mod outcome;
pub mod phase;
pub mod teardown;

pub use driver::{Orchestrator, OrchestratorSettings};
pub use options::{DeleteOptions, ReleaseOptions, StartOptions, StatusOptions, UpgradeOptions};
pub use outcome::{
    DeleteOutcome, DeploymentState, InstallSummary, ListRow, StartOutcome, StartPath, StatusDetails,
    StatusReport, UpgradeOutcome,
};
pub use phase::Phase;
pub use teardown::{ErrorPolicy, Teardown, TeardownFailure, TeardownReport};
