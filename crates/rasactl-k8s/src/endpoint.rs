//! Where the application can be reached from outside the cluster.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::debug;

use rasactl_core::{RasactlError, RasactlResult};

use crate::kubectl::items;
use crate::manager::KubernetesManager;

const NGINX_COMPONENT: &str = "app.kubernetes.io/component=nginx";
const TOKEN_KEY: &str = "rasaXToken";

fn url(host: &str, port: i64) -> String {
    if port == 80 {
        format!("http://{host}")
    } else {
        format!("http://{host}:{port}")
    }
}

/// First ExternalIP of any node, falling back to the first InternalIP.
pub fn node_address(nodes: &Value) -> Option<String> {
    let addresses: Vec<&Value> = items(nodes)
        .iter()
        .filter_map(|n| n.pointer("/status/addresses").and_then(Value::as_array))
        .flatten()
        .collect();
    let of_type = |wanted: &str| {
        addresses
            .iter()
            .find(|a| a.get("type").and_then(Value::as_str) == Some(wanted))
            .and_then(|a| a.get("address"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    of_type("ExternalIP").or_else(|| of_type("InternalIP"))
}

/// URL of the ingress service: load balancer address first, then a
/// node port on one of the nodes.
pub fn service_url(service: &Value, nodes: &Value) -> Option<String> {
    let port = service.pointer("/spec/ports/0")?;

    let ingress = service.pointer("/status/loadBalancer/ingress/0");
    let lb_host = ingress
        .and_then(|i| i.get("ip").or_else(|| i.get("hostname")))
        .and_then(Value::as_str);
    if let Some(host) = lb_host {
        let port = port.get("port").and_then(Value::as_i64).unwrap_or(80);
        return Some(url(host, port));
    }

    let node_port = port.get("nodePort").and_then(Value::as_i64)?;
    Some(url(&node_address(nodes)?, node_port))
}

/// Decode the access token from the application's secret.
pub fn decode_token(secret: &Value) -> Option<String> {
    let encoded = secret.pointer("/data")?.get(TOKEN_KEY)?.as_str()?;
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

impl KubernetesManager {
    pub(crate) async fn service_url(&self, namespace: &str, release: &str) -> RasactlResult<String> {
        let selector = format!("app.kubernetes.io/instance={release},{NGINX_COMPONENT}");
        let services = self
            .kubectl
            .get_json(&["services", "--namespace", namespace, "-l", &selector])
            .await?;
        let nodes = self.kubectl.get_json(&["nodes"]).await?;

        items(&services)
            .iter()
            .find_map(|svc| service_url(svc, &nodes))
            .ok_or_else(|| {
                RasactlError::NotFound(format!(
                    "no reachable address for release {release} in {namespace}"
                ))
            })
    }

    pub(crate) async fn access_token(&self, namespace: &str, release: &str) -> RasactlResult<Option<String>> {
        let name = format!("{release}-rasa");
        let secret = self
            .kubectl
            .get_optional(&["secret", &name, "--namespace", namespace])
            .await?;
        let token = secret.as_ref().and_then(decode_token);
        if token.is_none() {
            debug!(%namespace, secret = %name, "no access token found");
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes() -> Value {
        json!({"items": [{"status": {"addresses": [
            {"type": "Hostname", "address": "kind-control-plane"},
            {"type": "InternalIP", "address": "172.18.0.2"},
        ]}}]})
    }

    #[test]
    fn load_balancer_ip_wins() {
        let svc = json!({
            "spec": {"type": "LoadBalancer", "ports": [{"port": 8000, "nodePort": 31234}]},
            "status": {"loadBalancer": {"ingress": [{"ip": "34.1.2.3"}]}},
        });
        assert_eq!(service_url(&svc, &nodes()).as_deref(), Some("http://34.1.2.3:8000"));
    }

    #[test]
    fn load_balancer_hostname_on_port_80() {
        let svc = json!({
            "spec": {"type": "LoadBalancer", "ports": [{"port": 80}]},
            "status": {"loadBalancer": {"ingress": [{"hostname": "abc.elb.amazonaws.com"}]}},
        });
        assert_eq!(
            service_url(&svc, &nodes()).as_deref(),
            Some("http://abc.elb.amazonaws.com")
        );
    }

    #[test]
    fn node_port_falls_back_to_node_address() {
        let svc = json!({
            "spec": {"type": "NodePort", "ports": [{"port": 8000, "nodePort": 31234}]},
            "status": {"loadBalancer": {}},
        });
        assert_eq!(
            service_url(&svc, &nodes()).as_deref(),
            Some("http://172.18.0.2:31234")
        );
    }

    #[test]
    fn external_ip_preferred() {
        let nodes = json!({"items": [{"status": {"addresses": [
            {"type": "InternalIP", "address": "10.0.0.5"},
            {"type": "ExternalIP", "address": "35.0.0.5"},
        ]}}]});
        assert_eq!(node_address(&nodes).as_deref(), Some("35.0.0.5"));
    }

    #[test]
    fn cluster_ip_service_has_no_url() {
        let svc = json!({"spec": {"type": "ClusterIP", "ports": [{"port": 8000}]}});
        assert_eq!(service_url(&svc, &nodes()), None);
    }

    #[test]
    fn decodes_token() {
        let secret = json!({"data": {"rasaXToken": STANDARD.encode("s3cret")}});
        assert_eq!(decode_token(&secret).as_deref(), Some("s3cret"));
        assert_eq!(decode_token(&json!({"data": {}})), None);
    }
}
