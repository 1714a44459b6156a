//! Route handlers of the measurement endpoint

use super::{error::ApiError, state::AppState};
use crate::{
    models::api::{
        DownloadResponse, EchoedHeaders, HealthResponse, NetworkInfo, PingResponse, UploadRequest,
        UploadResponse,
    },
    payload,
    types::now_millis,
};
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderName, Uri},
    Json,
};
use serde_json::Value;
use std::net::SocketAddr;
use tracing::{debug, error};

/// Size used when the request names none or an unusable one
pub const FALLBACK_DOWNLOAD_KB: u64 = 100;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse::now())
}

pub async fn download_default(state: State<AppState>) -> Result<Json<DownloadResponse>, ApiError> {
    generate_download(&state, FALLBACK_DOWNLOAD_KB).await
}

pub async fn download(
    state: State<AppState>,
    Path(size_kb): Path<String>,
) -> Result<Json<DownloadResponse>, ApiError> {
    generate_download(&state, parse_size_kb(&size_kb)).await
}

async fn generate_download(state: &AppState, requested_kb: u64) -> Result<Json<DownloadResponse>, ApiError> {
    let size = requested_kb.min(state.config().max_download_kb);
    debug!(requested_kb, size, "generating download payload");

    let data = tokio::task::spawn_blocking(move || payload::random_base64(size))
        .await
        .map_err(|e| {
            error!("Payload worker failed: {}", e);
            ApiError::generation_failed(e.to_string())
        })?
        .map_err(|e| {
            error!("Failed to generate {}KB payload: {}", size, e);
            ApiError::generation_failed(e.to_string())
        })?;

    Ok(Json(DownloadResponse {
        size,
        timestamp: now_millis(),
        data,
    }))
}

pub async fn upload(
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let received = now_millis();
    let Json(request) = body?;

    let (Some(data), Some(timestamp), Some(size)) = (
        request.data.filter(is_truthy),
        request.timestamp.filter(is_truthy),
        request.size.filter(is_truthy),
    ) else {
        return Err(ApiError::missing_upload_fields());
    };

    let client_timestamp = timestamp_millis(&timestamp).ok_or_else(|| {
        ApiError::invalid_timestamp(format!("Expected milliseconds since the Unix epoch, got {}", timestamp))
    })?;
    let transfer_time = received.checked_sub(client_timestamp).ok_or_else(|| {
        ApiError::invalid_timestamp(format!("Timestamp {} is out of range", client_timestamp))
    })?;

    debug!(
        bytes = data.as_str().map(str::len).unwrap_or_default(),
        "upload received"
    );

    Ok(Json(UploadResponse {
        received,
        client_timestamp,
        data_size: size,
        transfer_time,
    }))
}

pub async fn network_info(
    state: State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<NetworkInfo> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);

    Json(NetworkInfo {
        client_ip: client_ip(&headers, peer, state.config().trust_forwarded_for),
        server_time: now_millis(),
        headers: echoed_headers(&headers),
    })
}

pub async fn health(state: State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime: state.uptime().as_secs_f64(),
        timestamp: now_millis(),
        version: crate::VERSION.to_string(),
    })
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}

/// Parse a requested download size the lenient way
///
/// Leading whitespace and an optional sign are skipped, then the leading
/// run of digits is used. Anything that does not yield a positive number
/// falls back to [`FALLBACK_DOWNLOAD_KB`]. Oversized values saturate and
/// are clamped by the caller.
pub fn parse_size_kb(raw: &str) -> u64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut value: u64 = 0;
    let mut seen = false;
    for digit in digits {
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(u64::from(digit - b'0'));
    }

    if !seen || negative || value == 0 {
        FALLBACK_DOWNLOAD_KB
    } else {
        value
    }
}

/// Whether an upload field counts as present
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Resolve the address the request came from
///
/// The first `X-Forwarded-For` hop wins when forwarding is trusted, then the
/// socket peer, then `"unknown"`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn echoed_headers(headers: &HeaderMap) -> EchoedHeaders {
    let get = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    EchoedHeaders {
        user_agent: get(header::USER_AGENT),
        connection: get(header::CONNECTION),
        accept_encoding: get(header::ACCEPT_ENCODING),
    }
}
