//! rasactl configuration file parser.
//!
//! The file is optional; every field has a default. Lookup order is an
//! explicit `--config` path, then `$RASACTL_CONFIG`, then
//! `<config dir>/rasactl/config.toml` when it exists.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RasactlError, RasactlResult};
use crate::naming::LOCAL_DOMAIN;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RASACTL_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RasactlConfig {
    pub kubernetes: KubernetesConfig,
    pub helm: HelmConfig,
    pub kind: KindConfig,
    pub readiness: ReadinessConfig,
    pub hosts: HostsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    pub kubectl: String,
    /// Kube context to use instead of the current one.
    pub context: Option<String>,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            context: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    pub binary: String,
    pub repository: String,
    pub chart: String,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: "helm".to_string(),
            repository: "https://pages.github.com/RasaHQ/rasa-x-helm".to_string(),
            chart: "rasa-x".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KindConfig {
    pub docker: String,
}

impl Default for KindConfig {
    fn default() -> Self {
        Self {
            docker: "docker".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Overall wait budget, e.g. "10m".
    pub timeout: String,
    /// First poll interval; doubles on each miss.
    pub interval: String,
    /// Upper bound for the poll interval.
    pub max_interval: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout: "10m".to_string(),
            interval: "1s".to_string(),
            max_interval: "10s".to_string(),
        }
    }
}

impl ReadinessConfig {
    pub fn timeout(&self) -> RasactlResult<Duration> {
        parse_duration(&self.timeout)
    }

    pub fn interval(&self) -> RasactlResult<Duration> {
        parse_duration(&self.interval)
    }

    pub fn max_interval(&self) -> RasactlResult<Duration> {
        parse_duration(&self.max_interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostsConfig {
    pub file: PathBuf,
    pub domain: String,
    pub address: String,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("/etc/hosts"),
            domain: LOCAL_DOMAIN.to_string(),
            address: "127.0.0.1".to_string(),
        }
    }
}

impl RasactlConfig {
    pub fn from_file(path: &Path) -> RasactlResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RasactlError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> RasactlResult<Self> {
        let config: RasactlConfig =
            toml::from_str(content).map_err(|e| RasactlError::Config(e.to_string()))?;
        config.readiness.timeout()?;
        config.readiness.interval()?;
        config.readiness.max_interval()?;
        Ok(config)
    }

    /// Resolve and load the config file, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> RasactlResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        match dirs::config_dir().map(|dir| dir.join("rasactl").join("config.toml")) {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "loading config file");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Parse a duration string like "5s", "500ms", "10m", "1h" or "1m30s".
///
/// A bare number is read as seconds. Segments are summed.
pub fn parse_duration(s: &str) -> RasactlResult<Duration> {
    let s = s.trim();
    let invalid = || RasactlError::Config(format!("invalid duration {s:?}"));
    if s.is_empty() {
        return Err(invalid());
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = s.parse().map_err(|_| invalid())?;
        return Ok(Duration::from_secs(secs));
    }

    let mut total_millis: u64 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (digits, tail) = rest.split_at(digits_end);
        let value: u64 = digits.parse().map_err(|_| invalid())?;

        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let millis = match unit {
            "ms" => 1,
            "s" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            _ => return Err(invalid()),
        };

        let segment = value.checked_mul(millis).ok_or_else(invalid)?;
        total_millis = total_millis.checked_add(segment).ok_or_else(invalid)?;
        rest = next;
    }
    Ok(Duration::from_millis(total_millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = RasactlConfig::from_toml("").unwrap();
        assert_eq!(config.kubernetes.kubectl, "kubectl");
        assert_eq!(config.helm.chart, "rasa-x");
        assert_eq!(config.hosts.file, PathBuf::from("/etc/hosts"));
        assert_eq!(config.readiness.timeout().unwrap(), Duration::from_secs(600));
    }

    #[test]
    fn parse_partial_file() {
        let toml_str = r#"
[kubernetes]
context = "kind-rasa"

[readiness]
timeout = "90s"

[hosts]
file = "/tmp/hosts"
"#;
        let config = RasactlConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.kubernetes.context.as_deref(), Some("kind-rasa"));
        assert_eq!(config.kubernetes.kubectl, "kubectl");
        assert_eq!(config.readiness.timeout().unwrap(), Duration::from_secs(90));
        assert_eq!(config.readiness.interval().unwrap(), Duration::from_secs(1));
        assert_eq!(config.hosts.domain, LOCAL_DOMAIN);
    }

    #[test]
    fn rejects_bad_duration() {
        let err = RasactlConfig::from_toml("[readiness]\ntimeout = \"soon\"").unwrap_err();
        assert!(matches!(err, RasactlError::Config(_)));
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[helm]\nbinary = \"/opt/helm\"\n").unwrap();

        let config = RasactlConfig::load(Some(&path)).unwrap();
        assert_eq!(config.helm.binary, "/opt/helm");
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = RasactlConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, RasactlError::Config(_)));
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_compound_duration() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h0m5s").unwrap(), Duration::from_secs(3605));
        assert_eq!(parse_duration("2s500ms").unwrap(), Duration::from_millis(2500));
        assert!(parse_duration("1m30").is_err());
        assert!(parse_duration("5x").is_err());
    }

    #[test]
    fn overflowing_duration_is_rejected() {
        let err = parse_duration("18446744073709551615h").unwrap_err();
        assert!(matches!(err, RasactlError::Config(_)));
        let err = parse_duration("18446744073709551s18446744073709551s").unwrap_err();
        assert!(matches!(err, RasactlError::Config(_)));
    }
}
