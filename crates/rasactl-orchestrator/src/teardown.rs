//! Error accumulator for multi-step teardown.
//!
//! Each step's result is handed to [`Teardown::step`]. Under
//! [`ErrorPolicy::AbortOnFirst`] the first failure is returned and the
//! caller's `?` stops the sequence; under [`ErrorPolicy::BestEffort`]
//! failures are logged and collected and the sequence runs to the end.

use rasactl_core::{RasactlError, RasactlResult};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    AbortOnFirst,
    BestEffort,
}

impl ErrorPolicy {
    pub fn from_force(force: bool) -> Self {
        if force {
            ErrorPolicy::BestEffort
        } else {
            ErrorPolicy::AbortOnFirst
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownFailure {
    pub step: &'static str,
    pub error: String,
}

/// Steps that ran, and those that failed under best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub completed: Vec<&'static str>,
    pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct Teardown {
    namespace: String,
    policy: ErrorPolicy,
    report: TeardownReport,
}

impl Teardown {
    pub fn new(namespace: &str, policy: ErrorPolicy) -> Self {
        Self {
            namespace: namespace.to_string(),
            policy,
            report: TeardownReport::default(),
        }
    }

    /// Record a step's result; `Err` only under `AbortOnFirst`.
    pub fn step(&mut self, step: &'static str, result: RasactlResult<()>) -> RasactlResult<()> {
        self.outcome(step, result).map(|_| ())
    }

    /// Like [`Teardown::step`] for steps producing a value; a swallowed
    /// failure yields `None`.
    pub fn outcome<T>(&mut self, step: &'static str, result: RasactlResult<T>) -> RasactlResult<Option<T>> {
        match result {
            Ok(value) => {
                debug!(namespace = %self.namespace, step, "teardown step done");
                self.report.completed.push(step);
                Ok(Some(value))
            }
            Err(e) => self.fail(step, e).map(|_| None),
        }
    }

    fn fail(&mut self, step: &'static str, error: RasactlError) -> RasactlResult<()> {
        match self.policy {
            ErrorPolicy::AbortOnFirst => Err(error),
            ErrorPolicy::BestEffort => {
                warn!(namespace = %self.namespace, step, error = %error, "teardown step failed, continuing");
                self.report.failures.push(TeardownFailure {
                    step,
                    error: error.to_string(),
                });
                Ok(())
            }
        }
    }

    pub fn finish(self) -> TeardownReport {
        self.report
    }
}
