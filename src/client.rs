//! HTTP transport used by the measurement driver

use crate::{
    error::{AppError, Result},
    models::api::ErrorResponse,
};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Request/response transport between the driver and an endpoint
///
/// Every call is a single JSON round trip. Implementations enforce their own
/// timeout and classify failures into connection, timeout, status and
/// malformed-response errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Base URL requests are issued against
    fn base_url(&self) -> &str;

    /// GET `path` and parse the body as JSON
    async fn get_json(&self, path: &str) -> Result<Value>;

    /// POST an already serialized JSON body to `path` and parse the response
    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<Value>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestClient {
    /// Create a transport for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(AppError::http_status(status.as_u16(), error_message(status, &body)));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AppError::malformed_response(format!("Invalid JSON response: {}", e)))
    }

    fn classify(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::timeout(format!(
                "Request timed out after {}s",
                self.timeout.as_secs_f64()
            ))
        } else {
            error.into()
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(path))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        self.read_json(response).await
    }

    async fn post_json(&self, path: &str, body: Vec<u8>) -> Result<Value> {
        let response = self
            .client
            .post(self.url(path))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        self.read_json(response).await
    }
}

/// Best-effort message for a non-success response
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorResponse>(body) {
        return match parsed.message {
            Some(message) => format!("{}: {}", parsed.error, message),
            None => parsed.error,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("unexpected status").to_string()
    } else {
        text.chars().take(200).collect()
    }
}

/// Deserialize a JSON value into a typed response
pub fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| AppError::malformed_response(format!("Unexpected {} response: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header as header_matcher, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn client_for(server: &MockServer, timeout: Duration) -> ReqwestClient {
        ReqwestClient::new(&server.uri(), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timestamp": 1_700_000_000_000i64,
                "message": "pong"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let value = client.get_json("/api/ping").await.unwrap();
        assert_eq!(value["message"], "pong");
    }

    #[tokio::test]
    async fn test_post_json_sends_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(header_matcher("content-type", "application/json"))
            .and(body_json(json!({ "data": "AAAA", "timestamp": 1000, "size": 4 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "received": 1250,
                "clientTimestamp": 1000,
                "dataSize": 4,
                "transferTime": 250
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let body = serde_json::to_vec(&json!({ "data": "AAAA", "timestamp": 1000, "size": 4 })).unwrap();
        let value = client.post_json("/api/upload", body).await.unwrap();
        assert_eq!(value["transferTime"], 250);
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        let error = client.get_json("/api/ping").await.unwrap_err();
        assert!(matches!(error, AppError::MalformedResponse(_)), "got {:?}", error);
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/download/100"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "Failed to generate test data",
                "message": "entropy source unavailable"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5)).await;
        match client.get_json("/api/download/100").await.unwrap_err() {
            AppError::HttpStatus { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to generate test data: entropy source unavailable");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "timestamp": 1, "message": "pong" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200)).await;
        let error = client.get_json("/api/ping").await.unwrap_err();
        assert!(matches!(error, AppError::Timeout(_)), "got {:?}", error);
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ReqwestClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let error = client.get_json("/api/ping").await.unwrap_err();
        assert!(matches!(error, AppError::Connection(_)), "got {:?}", error);
    }

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let client = ReqwestClient::new("http://localhost:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
        assert_eq!(client.url("/api/ping"), "http://localhost:3001/api/ping");
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, b""), "Bad Gateway");
        assert_eq!(error_message(StatusCode::BAD_REQUEST, b"  nope \n"), "nope");
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, br#"{"error":"Missing required fields: data, timestamp, size"}"#),
            "Missing required fields: data, timestamp, size"
        );
    }

    #[test]
    fn test_decode_reports_malformed() {
        let error = decode::<crate::models::PingResponse>(json!({ "pong": true }), "ping").unwrap_err();
        assert!(matches!(error, AppError::MalformedResponse(_)));
    }
}
