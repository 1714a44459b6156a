//! Request and response bodies exchanged between driver and endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /api/ping`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResponse {
    /// Server time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub message: String,
}

impl PingResponse {
    pub const ACK: &'static str = "pong";

    pub fn now() -> Self {
        Self {
            timestamp: crate::types::now_millis(),
            message: Self::ACK.to_string(),
        }
    }
}

/// `GET /api/download/:sizeKB`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResponse {
    /// Size actually generated, in KB, after clamping
    pub size: u64,
    pub timestamp: i64,
    /// Base64 encoded random bytes
    pub data: String,
}

/// Body the driver posts to `/api/upload`
///
/// `data` and `size` are encoded up front. The client timestamp goes in
/// last through [`UploadPayload::stamp`], right before the body is sent.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    encoded: Vec<u8>,
}

impl UploadPayload {
    pub fn new(data: &str, size: u64) -> serde_json::Result<Self> {
        let mut encoded = Vec::with_capacity(data.len() + 64);
        encoded.extend_from_slice(br#"{"data":"#);
        serde_json::to_writer(&mut encoded, data)?;
        encoded.extend_from_slice(br#","size":"#);
        serde_json::to_writer(&mut encoded, &size)?;
        encoded.extend_from_slice(br#","timestamp":"#);
        Ok(Self { encoded })
    }

    /// Finish the body with the client clock in milliseconds since the Unix epoch
    pub fn stamp(mut self, timestamp: i64) -> Vec<u8> {
        self.encoded.extend_from_slice(timestamp.to_string().as_bytes());
        self.encoded.push(b'}');
        self.encoded
    }
}

/// Body the endpoint accepts on `/api/upload`
///
/// Fields are kept loosely typed so that presence can be checked before
/// any type validation happens.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub size: Option<Value>,
}

/// `POST /api/upload` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Server time the request was received
    pub received: i64,
    pub client_timestamp: i64,
    /// Echo of the client-reported size
    pub data_size: Value,
    /// `received - client_timestamp`, measured across two clocks
    pub transfer_time: i64,
}

/// Whitelisted request headers echoed by `/api/network-info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EchoedHeaders {
    #[serde(rename = "user-agent", default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(rename = "accept-encoding", default, skip_serializing_if = "Option::is_none")]
    pub accept_encoding: Option<String>,
}

impl EchoedHeaders {
    /// The only header names the endpoint ever reports back
    pub const WHITELIST: [&'static str; 3] = ["user-agent", "connection", "accept-encoding"];
}

/// `GET /api/network-info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(rename = "clientIP")]
    pub client_ip: String,
    pub server_time: i64,
    pub headers: EchoedHeaders,
}

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Seconds since the endpoint started
    pub uptime: f64,
    pub timestamp: i64,
    #[serde(default)]
    pub version: String,
}

/// Body of every endpoint error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_payload_is_stamped_last() {
        let body = UploadPayload::new("QU\"JD", 3).unwrap().stamp(1_700_000_000_123);
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(text.ends_with(r#","timestamp":1700000000123}"#), "{}", text);

        let request: UploadRequest = serde_json::from_slice(&body).unwrap();
        assert_eq!(request.data, Some(json!("QU\"JD")));
        assert_eq!(request.timestamp, Some(json!(1_700_000_000_123i64)));
        assert_eq!(request.size, Some(json!(3)));
    }

    #[test]
    fn test_network_info_wire_names() {
        let info = NetworkInfo {
            client_ip: "10.0.0.7".to_string(),
            server_time: 1_700_000_000_000,
            headers: EchoedHeaders {
                user_agent: Some("curl/8.0".to_string()),
                connection: None,
                accept_encoding: Some("gzip".to_string()),
            },
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["clientIP"], "10.0.0.7");
        assert_eq!(value["serverTime"], 1_700_000_000_000i64);
        assert_eq!(value["headers"]["user-agent"], "curl/8.0");
        assert_eq!(value["headers"]["accept-encoding"], "gzip");
        assert!(value["headers"].get("connection").is_none());
    }

    #[test]
    fn test_upload_response_wire_names() {
        let value = json!({
            "received": 1250,
            "clientTimestamp": 1000,
            "dataSize": 4,
            "transferTime": 250
        });
        let parsed: UploadResponse = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.transfer_time, 250);
        assert_eq!(parsed.client_timestamp, 1000);
        assert_eq!(parsed.data_size, json!(4));
    }

    #[test]
    fn test_upload_request_tolerates_missing_fields() {
        let parsed: UploadRequest = serde_json::from_value(json!({ "data": "AAAA" })).unwrap();
        assert!(parsed.data.is_some());
        assert!(parsed.timestamp.is_none());
        assert!(parsed.size.is_none());
    }

    #[test]
    fn test_error_response_omits_empty_message() {
        let body = ErrorResponse {
            error: "Missing required fields: data, timestamp, size".to_string(),
            message: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("message").is_none());
    }
}
