//! rasactl-health — readiness probing for a deployed application.
//!
//! Polls the application's health endpoint until it answers, then reads
//! its version metadata.
//!
//! # Architecture
//!
//! ```text
//! HttpProber
//!   ├── wait_for_ready(url, timeout)
//!   │   ├── ReadinessTracker (attempts, backoff)
//!   │   └── http::get(<url>/api/health) → ProbeResult
//!   └── version(url, token)
//!       └── http::get(<url>/api/version) → VersionInfo
//! ```
//!
//! Any non-2xx answer and any connection failure count the same: not
//! ready yet. Backoff starts at the configured interval and doubles up
//! to a cap; the overall wait is bounded by the caller's timeout.

pub mod checker;
pub mod http;
pub mod prober;

pub use checker::{ProbeResult, ReadinessTracker};
pub use prober::HttpProber;
