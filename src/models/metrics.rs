//! Measurement results and the aggregate test report

use crate::models::api::NetworkInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate over the successful latency samples of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyResult {
    /// Mean round trip in milliseconds, rounded to the nearest integer
    pub average: u64,
    pub min: u64,
    pub max: u64,
    /// Number of samples that were requested, not the number that succeeded
    pub n_samples: u32,
}

/// One timed bulk transfer and the rates derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
    /// Size the rate was computed from
    #[serde(rename = "sizeKB")]
    pub size_kb: u64,

    /// Size the driver asked for, present only when the endpoint clamped it
    #[serde(rename = "requestedSizeKB", default, skip_serializing_if = "Option::is_none")]
    pub requested_size_kb: Option<u64>,

    /// Client-observed wall clock for the full round trip, in milliseconds
    #[serde(rename = "transferTime")]
    pub transfer_time_ms: u64,

    #[serde(rename = "speedBps")]
    pub speed_bps: u64,

    #[serde(rename = "speedKbps")]
    pub speed_kbps: u64,

    #[serde(rename = "speedMbps")]
    pub speed_mbps: f64,

    /// Endpoint's cross-clock transfer time, uploads only
    #[serde(rename = "serverProcessingTime", default, skip_serializing_if = "Option::is_none")]
    pub server_processing_time: Option<i64>,
}

/// Results of the sub-tests that ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<TransferResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<TransferResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_info: Option<NetworkInfo>,
}

/// Everything one full test run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullTestReport {
    pub server_url: String,
    pub timestamp: DateTime<Utc>,
    pub tests: TestResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FullTestReport {
    /// Create an empty report for a run against `server_url`
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            timestamp: Utc::now(),
            tests: TestResults::default(),
            error: None,
        }
    }

    /// Record a sub-test failure, keeping earlier ones
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error = Some(match self.error.take() {
            Some(previous) => format!("{}; {}", previous, message),
            None => message,
        });
    }

    /// Whether every step that ran completed
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}
