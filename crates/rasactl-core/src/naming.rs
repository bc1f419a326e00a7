//! Naming rules for deployments and the cluster objects derived from them.
//!
//! A deployment name doubles as its namespace name, so it must be a valid
//! RFC 1123 label. Every other object rasactl creates is named
//! deterministically from it.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RasactlError, RasactlResult};

/// Label key marking a namespace as managed by rasactl.
pub const OWNERSHIP_LABEL: &str = "rasactl";

/// Annotation key tagging volumes created by rasactl.
pub const OWNERSHIP_ANNOTATION: &str = "rasactl";

/// Name of the secret holding the deployment record.
pub const STATE_SECRET_NAME: &str = "rasactl";

/// Default domain suffix for local hostname routing.
pub const LOCAL_DOMAIN: &str = "rasactl.local.io";

const MAX_NAME_LEN: usize = 63;

static DNS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// Validate a deployment (namespace) name.
pub fn validate_name(name: &str) -> RasactlResult<()> {
    let invalid = |reason: &str| RasactlError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("the name can't be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("must be no more than 63 characters"));
    }
    if !DNS_LABEL.is_match(name) {
        return Err(invalid(
            "must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character",
        ));
    }
    Ok(())
}

/// Validate a chart version passed on the command line.
pub fn validate_chart_version(version: &str) -> RasactlResult<()> {
    semver::Version::parse(version.trim_start_matches('v'))
        .map(|_| ())
        .map_err(|e| RasactlError::Config(format!("invalid chart version {version:?}: {e}")))
}

/// Container and cluster node name of the local node for a namespace.
pub fn node_name(namespace: &str) -> String {
    format!("kind-{namespace}")
}

/// Persistent volume backing the project directory.
pub fn volume_name(namespace: &str) -> String {
    format!("rasactl-pv-{namespace}")
}

/// Claim bound to [`volume_name`].
pub fn claim_name(namespace: &str) -> String {
    format!("rasactl-pvc-{namespace}")
}

/// Hostname routed to a local deployment.
pub fn local_hostname(namespace: &str, domain: &str) -> String {
    format!("{namespace}.{domain}")
}
