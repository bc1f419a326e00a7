//! kubectl wrapper speaking JSON.

use serde_json::Value;

use rasactl_core::exec::{Tool, is_already_exists};
use rasactl_core::{RasactlError, RasactlResult};

/// kubectl bound to one kube context.
#[derive(Debug, Clone)]
pub struct Kubectl {
    tool: Tool,
    context: Option<String>,
}

impl Kubectl {
    pub fn new(binary: &str, context: Option<&str>) -> Self {
        let mut tool = Tool::new(binary);
        if let Some(ctx) = context {
            tool = tool.with_base_args(["--context", ctx]);
        }
        Self {
            tool,
            context: context.map(str::to_string),
        }
    }

    /// The underlying tool, for collaborators issuing their own calls.
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Name of the context in use.
    pub async fn current_context(&self) -> RasactlResult<String> {
        if let Some(ctx) = &self.context {
            return Ok(ctx.clone());
        }
        let out = self.tool.run(&["config", "current-context"]).await?;
        Ok(out.trim().to_string())
    }

    pub async fn run(&self, args: &[&str]) -> RasactlResult<String> {
        self.tool.run(args).await
    }

    /// `kubectl get ... -o json`.
    pub async fn get_json(&self, args: &[&str]) -> RasactlResult<Value> {
        let mut full = vec!["get"];
        full.extend_from_slice(args);
        full.extend_from_slice(&["-o", "json"]);
        self.tool.run_json(&full).await
    }

    /// `kubectl get`, mapping `NotFound` to `None`.
    pub async fn get_optional(&self, args: &[&str]) -> RasactlResult<Option<Value>> {
        match self.get_json(args).await {
            Ok(v) => Ok(Some(v)),
            Err(RasactlError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create an object from a manifest.
    ///
    /// Returns the created object, or `None` when it already existed.
    pub async fn create(&self, manifest: &Value) -> RasactlResult<Option<Value>> {
        let body = serde_json::to_vec(manifest).map_err(|e| RasactlError::Command {
            program: self.tool.program().to_string(),
            message: e.to_string(),
        })?;
        match self
            .tool
            .run_with_stdin(&["create", "-f", "-", "-o", "json"], &body)
            .await
        {
            Ok(out) => serde_json::from_str(&out)
                .map(Some)
                .map_err(|e| RasactlError::Command {
                    program: self.tool.program().to_string(),
                    message: format!("unexpected output: {e}"),
                }),
            Err(e) if is_already_exists(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// `items[]` of a list response.
pub fn items(list: &Value) -> &[Value] {
    list.get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// `metadata.name` of an object.
pub fn object_name(obj: &Value) -> Option<&str> {
    obj.pointer("/metadata/name").and_then(Value::as_str)
}
