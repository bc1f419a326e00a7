//! Generated chart values and helm argument lists.

use serde_json::{Map, Value, json};

use rasactl_core::ReleaseSpec;

/// Where the project directory is mounted inside the application.
pub const PROJECT_MOUNT_PATH: &str = "/app/git";

/// Values derived from a release spec.
///
/// The initial password is only set when `initial` is true (an install)
/// and the spec is not a resume; restarting a stopped deployment must
/// not re-run first-run initialization.
pub fn generated_values(spec: &ReleaseSpec, initial: bool) -> Value {
    let mut rasax = Map::new();
    if initial && !spec.resume {
        rasax.insert(
            "initialUser".to_string(),
            json!({ "password": spec.password }),
        );
    }
    if let Some(claim) = &spec.volume_claim {
        rasax.insert(
            "extraVolumes".to_string(),
            json!([{ "name": "project", "persistentVolumeClaim": { "claimName": claim } }]),
        );
        rasax.insert(
            "extraVolumeMounts".to_string(),
            json!([{ "name": "project", "mountPath": PROJECT_MOUNT_PATH }]),
        );
    }
    if let Some(node) = &spec.node_name {
        rasax.insert(
            "nodeSelector".to_string(),
            json!({ "kubernetes.io/hostname": node }),
        );
    }

    let mut values = Map::new();
    if !rasax.is_empty() {
        values.insert("rasax".to_string(), Value::Object(rasax));
    }
    if let Some(host) = &spec.hostname {
        values.insert(
            "ingress".to_string(),
            json!({ "enabled": true, "hosts": [{ "host": host, "paths": ["/"] }] }),
        );
    }
    Value::Object(values)
}

/// Arguments shared by install and upgrade, after the subcommand.
///
/// `generated` is the path of the rendered [`generated_values`] file.
pub fn release_args(spec: &ReleaseSpec, chart: &str, repository: &str, generated: &str) -> Vec<String> {
    let mut args = vec![
        spec.release_name.clone(),
        chart.to_string(),
        "--repo".to_string(),
        repository.to_string(),
        "--namespace".to_string(),
        spec.namespace.clone(),
        "--timeout".to_string(),
        format!("{}s", spec.timeout.as_secs()),
    ];
    if let Some(version) = &spec.chart_version {
        args.push("--version".to_string());
        args.push(version.trim_start_matches('v').to_string());
    }
    if let Some(file) = &spec.values_file {
        args.push("--values".to_string());
        args.push(file.to_string_lossy().into_owned());
    }
    args.push("--values".to_string());
    args.push(generated.to_string());
    if spec.atomic {
        args.push("--atomic".to_string());
    }
    args
}

/// Extra upgrade arguments; resuming always reuses the stored values.
pub fn upgrade_flags(spec: &ReleaseSpec) -> Vec<String> {
    let mut flags = Vec::new();
    if spec.reuse_values || spec.resume {
        flags.push("--reuse-values".to_string());
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn first_install_sets_password() {
        let spec = ReleaseSpec::new("demo", "rasa-x");
        let values = generated_values(&spec, true);
        assert_eq!(values["rasax"]["initialUser"]["password"], "rasaxlocal");
        assert!(values.get("ingress").is_none());
    }

    #[test]
    fn resume_and_upgrade_skip_password() {
        let mut spec = ReleaseSpec::new("demo", "rasa-x");
        assert_eq!(generated_values(&spec, false), json!({}));
        spec.resume = true;
        assert_eq!(generated_values(&spec, true), json!({}));
    }

    #[test]
    fn project_mount_and_node_pinning() {
        let mut spec = ReleaseSpec::new("demo", "rasa-x");
        spec.volume_claim = Some("rasactl-pvc-demo".to_string());
        spec.node_name = Some("kind-demo".to_string());
        spec.hostname = Some("demo.rasactl.local.io".to_string());

        let values = generated_values(&spec, false);
        assert_eq!(
            values["rasax"]["extraVolumes"][0]["persistentVolumeClaim"]["claimName"],
            "rasactl-pvc-demo"
        );
        assert_eq!(values["rasax"]["extraVolumeMounts"][0]["mountPath"], "/app/git");
        assert_eq!(values["rasax"]["nodeSelector"]["kubernetes.io/hostname"], "kind-demo");
        assert_eq!(values["ingress"]["hosts"][0]["host"], "demo.rasactl.local.io");
    }

    #[test]
    fn release_args_layer_user_values_first() {
        let mut spec = ReleaseSpec::new("demo", "rasa-x");
        spec.chart_version = Some("v2.0.0".to_string());
        spec.values_file = Some(PathBuf::from("/tmp/mine.yaml"));
        spec.atomic = true;
        spec.timeout = Duration::from_secs(300);

        let args = release_args(&spec, "rasa-x", "https://charts.example", "/tmp/gen.json");
        assert_eq!(&args[..2], &["rasa-x".to_string(), "rasa-x".to_string()]);
        let at = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[at("--version") + 1], "2.0.0");
        assert_eq!(args[at("--timeout") + 1], "300s");
        let values: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "--values")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(values, vec!["/tmp/mine.yaml", "/tmp/gen.json"]);
        assert!(args.contains(&"--atomic".to_string()));
    }

    #[test]
    fn resume_forces_reuse_values() {
        let mut spec = ReleaseSpec::new("demo", "rasa-x");
        spec.reuse_values = false;
        assert!(upgrade_flags(&spec).is_empty());
        spec.resume = true;
        assert_eq!(upgrade_flags(&spec), vec!["--reuse-values".to_string()]);
    }
}
