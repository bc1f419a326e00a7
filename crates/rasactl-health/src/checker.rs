//! Readiness probe bookkeeping.
//!
//! Tracks consecutive probe results while waiting for an application
//! to come up, with exponential backoff between attempts.

use std::time::Duration;

use tracing::debug;

/// Result of a single readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The health endpoint returned 2xx.
    Ready,
    /// The health endpoint returned non-2xx.
    NotReady,
    /// The probe could not be executed (connection error, timeout).
    Failed,
}

/// Tracks probe attempts for one readiness wait.
#[derive(Debug)]
pub struct ReadinessTracker {
    ready: bool,
    attempts: u32,
    consecutive_failures: u32,
    /// Current backoff interval.
    current_backoff: Duration,
    base_interval: Duration,
    max_backoff: Duration,
}

impl ReadinessTracker {
    pub fn new(base_interval: Duration, max_backoff: Duration) -> Self {
        Self {
            ready: false,
            attempts: 0,
            consecutive_failures: 0,
            current_backoff: base_interval,
            base_interval,
            max_backoff: max_backoff.max(base_interval),
        }
    }

    /// Record a probe result; returns whether the application is ready.
    pub fn record(&mut self, result: ProbeResult) -> bool {
        self.attempts += 1;
        match result {
            ProbeResult::Ready => {
                self.consecutive_failures = 0;
                self.current_backoff = self.base_interval;
                self.ready = true;
            }
            ProbeResult::NotReady | ProbeResult::Failed => {
                self.consecutive_failures += 1;
                self.ready = false;
                // Exponential backoff: double the interval up to max.
                self.current_backoff = (self.current_backoff * 2).min(self.max_backoff);
                debug!(
                    attempts = self.attempts,
                    ?result,
                    next = ?self.current_backoff,
                    "application not ready yet"
                );
            }
        }
        self.ready
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Interval to wait before the next probe.
    pub fn next_interval(&self) -> Duration {
        self.current_backoff
    }
}
