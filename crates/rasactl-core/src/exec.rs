//! External tool runner.
//!
//! kubectl, helm and docker are driven as child processes. Failures are
//! classified from stderr into the shared error taxonomy so callers can
//! tell a missing object from an unreachable backend.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{RasactlError, RasactlResult};

const NOT_FOUND_MARKERS: &[&str] = &[
    "NotFound",
    "not found",
    "No such container",
    "No such object",
];

const UNAVAILABLE_MARKERS: &[&str] = &[
    "Unable to connect to the server",
    "connection refused",
    "Kubernetes cluster unreachable",
    "Cannot connect to the Docker daemon",
    "i/o timeout",
];

const ALREADY_EXISTS_MARKERS: &[&str] = &["AlreadyExists", "already exists"];

/// A command-line tool plus arguments prepended to every invocation.
#[derive(Debug, Clone)]
pub struct Tool {
    program: String,
    base_args: Vec<String>,
}

impl Tool {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            base_args: Vec::new(),
        }
    }

    /// Add arguments passed before the per-call arguments (e.g. `--context`).
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool and return its stdout.
    pub async fn run(&self, args: &[&str]) -> RasactlResult<String> {
        self.execute(args, None).await
    }

    /// Run the tool feeding `input` on stdin.
    pub async fn run_with_stdin(&self, args: &[&str], input: &[u8]) -> RasactlResult<String> {
        self.execute(args, Some(input)).await
    }

    /// Run the tool and parse stdout as JSON.
    pub async fn run_json(&self, args: &[&str]) -> RasactlResult<serde_json::Value> {
        let stdout = self.run(args).await?;
        serde_json::from_str(&stdout).map_err(|e| RasactlError::Command {
            program: self.program.clone(),
            message: format!("unexpected output: {e}"),
        })
    }

    async fn execute(&self, args: &[&str], input: Option<&[u8]>) -> RasactlResult<String> {
        debug!(program = %self.program, ?args, "running external tool");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            RasactlError::BackendUnavailable(format!("failed to spawn {}: {e}", self.program))
        })?;

        if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(data).await.map_err(|e| {
                RasactlError::BackendUnavailable(format!("{}: writing stdin: {e}", self.program))
            })?;
            // Dropping stdin closes the pipe so the tool sees EOF.
        }

        let output = child.wait_with_output().await.map_err(|e| {
            RasactlError::BackendUnavailable(format!("{}: {e}", self.program))
        })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!(program = %self.program, status = ?output.status.code(), %stderr, "external tool failed");
        Err(classify_failure(&self.program, &stderr))
    }
}

/// Map a tool's stderr onto the error taxonomy.
pub fn classify_failure(program: &str, stderr: &str) -> RasactlError {
    if UNAVAILABLE_MARKERS.iter().any(|m| stderr.contains(m)) {
        RasactlError::BackendUnavailable(format!("{program}: {stderr}"))
    } else if NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m)) {
        RasactlError::NotFound(format!("{program}: {stderr}"))
    } else {
        RasactlError::Command {
            program: program.to_string(),
            message: stderr.to_string(),
        }
    }
}

/// Whether a failed create reported that the object already exists.
pub fn is_already_exists(err: &RasactlError) -> bool {
    match err {
        RasactlError::Command { message, .. } => {
            ALREADY_EXISTS_MARKERS.iter().any(|m| message.contains(m))
        }
        _ => false,
    }
}
