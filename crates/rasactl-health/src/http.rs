//! Minimal HTTP/1 GET client over a plain TCP connection.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use tracing::debug;

use rasactl_core::{RasactlError, RasactlResult};

const USER_AGENT: &str = concat!("rasactl/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: ::http::StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Join a base URL and an absolute path.
pub fn join(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Issue a GET request; the whole exchange is bounded by `timeout`.
pub async fn get(url: &str, headers: &[(&str, &str)], timeout: Duration) -> RasactlResult<HttpResponse> {
    let probe_err = |msg: String| RasactlError::Probe(format!("{url}: {msg}"));

    let uri: ::http::Uri = url
        .parse()
        .map_err(|e| probe_err(format!("invalid url: {e}")))?;
    if uri.scheme_str() != Some("http") {
        return Err(probe_err("only http:// urls are supported".to_string()));
    }
    let host = uri
        .host()
        .ok_or_else(|| probe_err("url has no host".to_string()))?;
    let address = format!("{host}:{}", uri.port_u16().unwrap_or(80));
    let authority = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .unwrap_or_else(|| address.clone());
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let exchange = async {
        let stream = tokio::net::TcpStream::connect(&address)
            .await
            .map_err(|e| probe_err(format!("connection failed: {e}")))?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| probe_err(format!("handshake failed: {e}")))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = ::http::Request::builder()
            .method("GET")
            .uri(path.as_str())
            .header("host", authority.as_str())
            .header("user-agent", USER_AGENT);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder
            .body(Empty::<Bytes>::new())
            .map_err(|e| probe_err(format!("invalid request: {e}")))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| probe_err(format!("request failed: {e}")))?;
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| probe_err(format!("reading body: {e}")))?
            .to_bytes();

        debug!(%url, %status, "http request completed");
        Ok::<_, RasactlError>(HttpResponse { status, body })
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => result,
        Err(_) => Err(probe_err(format!("timed out after {timeout:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_strips_trailing_slash() {
        assert_eq!(join("http://demo.local/", "/api/health"), "http://demo.local/api/health");
        assert_eq!(join("http://10.0.0.1:8080", "/api/version"), "http://10.0.0.1:8080/api/version");
    }

    #[tokio::test]
    async fn rejects_https() {
        let err = get("https://example.com/", &[], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, RasactlError::Probe(_)));
    }

    #[tokio::test]
    async fn rejects_garbage_url() {
        let err = get("not a url", &[], Duration::from_millis(100)).await.unwrap_err();
        assert!(matches!(err, RasactlError::Probe(_)));
    }
}
