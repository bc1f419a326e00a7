//! HttpProber — readiness and version checks over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use rasactl_core::types::UNKNOWN_VERSION;
use rasactl_core::{RasactlError, RasactlResult, ReadinessProber, VersionInfo};

use crate::checker::{ProbeResult, ReadinessTracker};
use crate::http;

pub const HEALTH_PATH: &str = "/api/health";
pub const VERSION_PATH: &str = "/api/version";

/// Shape of the `/api/version` answer.
#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(default)]
    rasa: RasaVersions,
    #[serde(rename = "rasa-x")]
    rasa_x: String,
    #[serde(default)]
    enterprise: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RasaVersions {
    production: Option<String>,
    worker: Option<String>,
}

/// Parse a version endpoint body.
pub fn parse_version(body: &[u8]) -> RasactlResult<VersionInfo> {
    let resp: VersionResponse = serde_json::from_slice(body)
        .map_err(|e| RasactlError::Probe(format!("malformed version response: {e}")))?;
    let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN_VERSION.to_string());
    Ok(VersionInfo {
        production: or_unknown(resp.rasa.production),
        worker: or_unknown(resp.rasa.worker),
        rasa_x: resp.rasa_x,
        enterprise: resp.enterprise,
    })
}

/// Prober polling the application's HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpProber {
    /// First poll interval; doubles on each miss.
    interval: Duration,
    max_interval: Duration,
    /// Bound for a single request.
    request_timeout: Duration,
}

impl Default for HttpProber {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl HttpProber {
    pub fn new(interval: Duration, max_interval: Duration) -> Self {
        Self {
            interval,
            max_interval,
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Probe the health endpoint once.
    pub async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult {
        match http::get(&http::join(url, HEALTH_PATH), &[], timeout).await {
            Ok(resp) if resp.is_success() => ProbeResult::Ready,
            Ok(resp) => {
                debug!(%url, status = %resp.status, "health endpoint not ready");
                ProbeResult::NotReady
            }
            Err(e) => {
                debug!(%url, error = %e, "health probe failed");
                ProbeResult::Failed
            }
        }
    }

    /// Whether anything answers at `url`, regardless of status.
    pub async fn is_reachable(&self, url: &str) -> bool {
        http::get(url, &[], self.request_timeout).await.is_ok()
    }
}

#[async_trait]
impl ReadinessProber for HttpProber {
    async fn wait_for_ready(&self, url: &str, timeout: Duration) -> RasactlResult<()> {
        let deadline = Instant::now() + timeout;
        let mut tracker = ReadinessTracker::new(self.interval, self.max_interval);
        info!(%url, timeout_secs = timeout.as_secs(), "waiting for the application to be ready");

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let result = self.probe(url, self.request_timeout.min(remaining)).await;
            if tracker.record(result) {
                info!(%url, attempts = tracker.attempts(), "application is ready");
                return Ok(());
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RasactlError::ReadinessTimeout {
                    url: url.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(tracker.next_interval().min(remaining)).await;
        }
    }

    async fn version(&self, url: &str, token: Option<&str>) -> RasactlResult<VersionInfo> {
        let bearer = token.map(|t| format!("Bearer {t}"));
        let headers: Vec<(&str, &str)> = bearer
            .as_deref()
            .map(|value| vec![("authorization", value)])
            .unwrap_or_default();

        let resp = http::get(&http::join(url, VERSION_PATH), &headers, self.request_timeout).await?;
        if !resp.is_success() {
            return Err(RasactlError::Probe(format!(
                "{url}{VERSION_PATH} answered {}",
                resp.status
            )));
        }
        parse_version(&resp.body)
    }
}
