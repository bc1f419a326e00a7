//! Mapping between [`DeploymentRecord`] and the secret's key-value data.

use std::collections::BTreeMap;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use rasactl_core::{DeploymentRecord, RasactlError, RasactlResult};

pub const KEY_RELEASE_NAME: &str = "helm-release-name";
pub const KEY_PROJECT_PATH: &str = "project-path";
pub const KEY_RASA_X_VERSION: &str = "rasa-x-version";
pub const KEY_RASA_WORKER_VERSION: &str = "rasa-worker-version";
pub const KEY_ENTERPRISE: &str = "enterprise";

/// Encode a record as plain string data (every key present).
pub fn to_string_data(record: &DeploymentRecord) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert(KEY_RELEASE_NAME.to_string(), record.release_name.clone());
    data.insert(
        KEY_PROJECT_PATH.to_string(),
        record
            .project_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    );
    data.insert(
        KEY_RASA_X_VERSION.to_string(),
        record.application_version.clone().unwrap_or_default(),
    );
    data.insert(
        KEY_RASA_WORKER_VERSION.to_string(),
        record.worker_version.clone().unwrap_or_default(),
    );
    data.insert(KEY_ENTERPRISE.to_string(), record.enterprise.to_string());
    data
}

/// Decode plain string data back into a record.
pub fn from_string_data(data: &BTreeMap<String, String>) -> RasactlResult<DeploymentRecord> {
    let field = |key: &str| {
        data.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let release_name = field(KEY_RELEASE_NAME).ok_or_else(|| {
        RasactlError::Persistence(format!("malformed state record: missing {KEY_RELEASE_NAME}"))
    })?;

    Ok(DeploymentRecord {
        release_name,
        project_path: field(KEY_PROJECT_PATH).map(PathBuf::from),
        application_version: field(KEY_RASA_X_VERSION),
        worker_version: field(KEY_RASA_WORKER_VERSION),
        enterprise: matches!(field(KEY_ENTERPRISE).as_deref(), Some("true" | "active")),
    })
}

/// Decode the base64 `data` object of a secret as returned by the API.
pub fn decode_secret_data(secret: &serde_json::Value) -> RasactlResult<BTreeMap<String, String>> {
    let mut decoded = BTreeMap::new();
    let Some(data) = secret.get("data").and_then(|d| d.as_object()) else {
        return Ok(decoded);
    };

    for (key, value) in data {
        let encoded = value.as_str().unwrap_or_default();
        let bytes = STANDARD.decode(encoded).map_err(|e| {
            RasactlError::Persistence(format!("malformed state record: {key}: {e}"))
        })?;
        decoded.insert(key.clone(), String::from_utf8_lossy(&bytes).into_owned());
    }
    Ok(decoded)
}
