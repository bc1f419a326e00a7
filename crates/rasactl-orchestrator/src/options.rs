//! Option structs passed to each operation.

use std::path::PathBuf;
use std::time::Duration;

use rasactl_core::types::{DEFAULT_PASSWORD, DEFAULT_RELEASE_NAME};
use rasactl_core::ReleaseSpec;

/// Release configuration shared by start and upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOptions {
    pub release_name: String,
    pub chart_version: Option<String>,
    pub values_file: Option<PathBuf>,
    pub atomic: bool,
    pub reuse_values: bool,
    /// Initial admin password, used on first install.
    pub password: String,
    /// Budget for the release operation and the readiness wait.
    pub wait_timeout: Duration,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            release_name: DEFAULT_RELEASE_NAME.to_string(),
            chart_version: None,
            values_file: None,
            atomic: false,
            reuse_values: true,
            password: DEFAULT_PASSWORD.to_string(),
            wait_timeout: Duration::from_secs(600),
        }
    }
}

impl ReleaseOptions {
    /// Base release spec for a namespace.
    pub fn spec(&self, namespace: &str) -> ReleaseSpec {
        ReleaseSpec {
            chart_version: self.chart_version.clone(),
            values_file: self.values_file.clone(),
            password: self.password.clone(),
            atomic: self.atomic,
            reuse_values: self.reuse_values,
            timeout: self.wait_timeout,
            ..ReleaseSpec::new(namespace, &self.release_name)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Host directory to mount into a local node.
    pub project_path: Option<PathBuf>,
    pub release: ReleaseOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeOptions {
    pub release: ReleaseOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Skip the ownership check and keep going past failed steps.
    pub force: bool,
    /// Delete the namespace itself.
    pub prune: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOptions {
    /// Include release status and pods.
    pub details: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_carries_release_options() {
        let options = ReleaseOptions {
            chart_version: Some("2.0.0".to_string()),
            atomic: true,
            reuse_values: false,
            wait_timeout: Duration::from_secs(30),
            ..ReleaseOptions::default()
        };
        let spec = options.spec("demo");
        assert_eq!(spec.namespace, "demo");
        assert_eq!(spec.release_name, "rasa-x");
        assert_eq!(spec.chart_version.as_deref(), Some("2.0.0"));
        assert!(spec.atomic);
        assert!(!spec.reuse_values);
        assert!(!spec.resume);
        assert_eq!(spec.timeout, Duration::from_secs(30));
        assert_eq!(spec.password, "rasaxlocal");
    }
}
