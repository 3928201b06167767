//! Network provider.
//!
//! Sends: POST {base_url}/analyze with a JSON body and a bearer credential.
//! Expects a JSON object carrying finding arrays and an optimized-code string.

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;

use super::{AnalysisProvider, ProviderError, ProviderResponse};
use crate::findings::CheckCategory;
use crate::input::AnalysisRequest;
use crate::language::Language;

/// Wire body of an analysis call.
#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    code: &'a str,
    language: Language,
    options: &'a BTreeSet<CheckCategory>,
}

/// Provider backed by a remote HTTP endpoint.
pub struct HttpProvider {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("codescope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;

        Ok(Self {
            http,
            endpoint: endpoint_url(base_url),
            api_key,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the outgoing request without sending it.
    pub fn build_request(&self, request: &AnalysisRequest) -> Result<Request, ProviderError> {
        let body = RequestBody {
            code: request.code(),
            language: request.language(),
            options: request.options(),
        };

        let mut builder = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
            .build()
            .map_err(|e| ProviderError::Build(e.to_string()))
    }
}

#[async_trait]
impl AnalysisProvider for HttpProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ProviderResponse, ProviderError> {
        let outgoing = self.build_request(request)?;

        let response = self.http.execute(outgoing).await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Network(e)
            }
        })?;

        match response.status().as_u16() {
            200..=299 => response
                .json::<ProviderResponse>()
                .await
                .map_err(|e| ProviderError::InvalidBody(e.to_string())),
            status @ (401 | 403) => Err(ProviderError::Unauthorized(status)),
            status @ (400 | 422) => Err(ProviderError::BadRequest(status)),
            429 => Err(ProviderError::RateLimited),
            status => Err(ProviderError::Status(status)),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn endpoint_url(base_url: &str) -> String {
    format!("{}/analyze", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::input::{capture, RawInput};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn request() -> AnalysisRequest {
        let input = RawInput {
            code: "var a = 1;",
            language: Some("javascript"),
            options: vec![CheckCategory::Issues, CheckCategory::Security],
            ..Default::default()
        };
        capture(&input, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url("https://a.local/api"), "https://a.local/api/analyze");
        assert_eq!(endpoint_url("https://a.local/api/"), "https://a.local/api/analyze");
    }

    #[test]
    fn test_build_request_carries_bearer_and_json() {
        let provider = HttpProvider::new(
            "https://a.local/api",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let outgoing = provider.build_request(&request()).unwrap();

        assert_eq!(outgoing.method(), &reqwest::Method::POST);
        assert_eq!(outgoing.url().as_str(), "https://a.local/api/analyze");
        assert_eq!(
            outgoing.headers().get("authorization").unwrap(),
            "Bearer secret"
        );
        assert_eq!(
            outgoing.headers().get("content-type").unwrap(),
            "application/json"
        );

        let body = outgoing.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["code"], "var a = 1;");
        assert_eq!(json["language"], "javascript");
        assert_eq!(json["options"], serde_json::json!(["issues", "security"]));
    }

    #[test]
    fn test_build_request_without_key_has_no_auth_header() {
        let provider = HttpProvider::new("https://a.local", None, Duration::from_secs(5)).unwrap();
        let outgoing = provider.build_request(&request()).unwrap();
        assert!(outgoing.headers().get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let provider =
            HttpProvider::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();
        let err = provider.analyze(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout));
        assert!(err.is_retryable());
    }

    /// Serve one canned HTTP response on a local port and return its base URL.
    async fn serve_once(status: u16, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    /// Consume the request head and its declared body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    async fn analyze_against(status: u16, body: &'static str) -> Result<ProviderResponse, ProviderError> {
        let base_url = serve_once(status, body).await;
        let provider = HttpProvider::new(&base_url, Some("secret".to_string()), Duration::from_secs(5)).unwrap();
        provider.analyze(&request()).await
    }

    #[tokio::test]
    async fn test_success_returns_json_body() {
        let response = analyze_against(200, r#"{"issues":[{"title":"Use of 'var' declaration"}]}"#)
            .await
            .unwrap();
        assert_eq!(response["issues"][0]["title"], "Use of 'var' declaration");
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_not_retryable() {
        for status in [401, 403] {
            let err = analyze_against(status, "{}").await.unwrap_err();
            assert!(matches!(err, ProviderError::Unauthorized(s) if s == status), "{:?}", err);
            assert!(!err.is_retryable());
        }
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_retryable() {
        let err = analyze_against(422, r#"{"error":"bad language"}"#).await.unwrap_err();
        assert!(matches!(err, ProviderError::BadRequest(422)), "{:?}", err);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_rate_limit_is_retryable() {
        let err = analyze_against(429, "{}").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited), "{:?}", err);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let err = analyze_against(500, "{}").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(500)), "{:?}", err);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_body() {
        let err = analyze_against(200, "not json").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidBody(_)), "{:?}", err);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_malformed_endpoint_fails_to_build() {
        let provider = HttpProvider::new("not a url", None, Duration::from_secs(5)).unwrap();
        let err = provider.build_request(&request()).unwrap_err();
        assert!(matches!(err, ProviderError::Build(_)), "{:?}", err);
        assert!(!err.is_retryable());
    }
}
