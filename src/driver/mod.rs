//! Measurement driver
//!
//! Issues sequences of requests against a measurement endpoint, times each
//! round trip on the client clock and derives latency and throughput
//! figures. Sub-tests always run one after another; overlapping transfers
//! would corrupt each other's throughput.

use crate::{
    client::{decode, HttpClient, ReqwestClient},
    error::{AppError, Result},
    models::{
        api::{DownloadResponse, HealthResponse, NetworkInfo, PingResponse, UploadPayload, UploadResponse},
        config::TestOptions,
        metrics::{FullTestReport, LatencyResult, TransferResult},
    },
    payload,
    stats::{self, LatencySampler},
    types::{now_millis, TestPhase},
};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Endpoint paths
pub mod paths {
    pub const PING: &str = "/api/ping";
    pub const DOWNLOAD: &str = "/api/download";
    pub const UPLOAD: &str = "/api/upload";
    pub const NETWORK_INFO: &str = "/api/network-info";
    pub const HEALTH: &str = "/api/health";
}

/// Drives measurements against one endpoint
pub struct SpeedTester<C: HttpClient> {
    client: C,
    ping_interval: Duration,
}

impl SpeedTester<ReqwestClient> {
    /// Create a tester for `server_url` using the reqwest transport
    pub fn connect(server_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::new(ReqwestClient::new(server_url, timeout)?))
    }
}

impl<C: HttpClient> SpeedTester<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            ping_interval: crate::defaults::PING_INTERVAL,
        }
    }

    /// Override the pause between consecutive pings
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn server_url(&self) -> &str {
        self.client.base_url()
    }

    /// Time `samples` pings and aggregate the successful ones
    pub async fn test_latency(&self, samples: u32) -> Result<LatencyResult> {
        info!("Testing latency with {} samples...", samples);
        let mut sampler = LatencySampler::new(samples);

        for i in 0..samples {
            match self.ping_once().await {
                Ok(elapsed_ms) => {
                    info!("Ping {}: {}ms", i + 1, elapsed_ms);
                    sampler.record_success(elapsed_ms);
                }
                Err(e) => {
                    warn!("Ping {} failed: {}", i + 1, e);
                    sampler.record_failure(e.to_string());
                }
            }

            if i + 1 < samples && !self.ping_interval.is_zero() {
                tokio::time::sleep(self.ping_interval).await;
            }
        }

        debug!(
            succeeded = sampler.success_count(),
            failed = sampler.failure_count(),
            "latency sampling finished"
        );
        sampler.finish()
    }

    async fn ping_once(&self) -> Result<u64> {
        let start = Instant::now();
        let value = self.client.get_json(paths::PING).await?;
        let elapsed_ms = elapsed_millis(start);

        let pong: PingResponse = decode(value, "ping")?;
        if pong.message != PingResponse::ACK {
            return Err(AppError::malformed_response(format!(
                "Unexpected ping acknowledgement '{}'",
                pong.message
            )));
        }

        Ok(elapsed_ms)
    }

    /// Time one download of `size_kb` kilobytes
    ///
    /// The rate is computed from the size the endpoint reports having sent,
    /// which differs from `size_kb` when the endpoint clamps the request.
    pub async fn test_download_speed(&self, size_kb: u64) -> Result<TransferResult> {
        info!("Testing download speed with {}KB...", size_kb);
        let path = format!("{}/{}", paths::DOWNLOAD, size_kb);

        let start = Instant::now();
        let value = self.client.get_json(&path).await?;
        let response: DownloadResponse = decode(value, "download")?;
        let elapsed_ms = elapsed_millis(start);

        if response.size == 0 {
            return Err(AppError::malformed_response("Download response reported zero size"));
        }

        let mut result = stats::transfer_result(response.size, elapsed_ms);
        if response.size != size_kb {
            warn!(
                "Server sent {}KB instead of the requested {}KB",
                response.size, size_kb
            );
            result.requested_size_kb = Some(size_kb);
        }

        Ok(result)
    }

    /// Time one upload of `size_kb` kilobytes of random data
    ///
    /// Payload generation happens before the clock starts.
    pub async fn test_upload_speed(&self, size_kb: u64) -> Result<TransferResult> {
        info!("Testing upload speed with {}KB...", size_kb);

        let data = payload::random_base64(size_kb)?;
        let prepared = UploadPayload::new(&data, size_kb)
            .map_err(|e| AppError::internal(format!("Failed to encode upload payload: {}", e)))?;
        drop(data);

        let body = prepared.stamp(now_millis());
        let start = Instant::now();
        let value = self.client.post_json(paths::UPLOAD, body).await?;
        let response: UploadResponse = decode(value, "upload")?;
        let elapsed_ms = elapsed_millis(start);

        let mut result = stats::transfer_result(size_kb, elapsed_ms);
        result.server_processing_time = Some(response.transfer_time);
        Ok(result)
    }

    /// Fetch what the endpoint sees of this client
    pub async fn get_network_info(&self) -> Result<NetworkInfo> {
        let value = self.client.get_json(paths::NETWORK_INFO).await?;
        decode(value, "network-info")
    }

    /// Confirm the endpoint is up before spending time on a run
    pub async fn check_health(&self) -> Result<HealthResponse> {
        let value = self.client.get_json(paths::HEALTH).await?;
        let health: HealthResponse = decode(value, "health")?;
        if health.status != "healthy" {
            return Err(AppError::malformed_response(format!(
                "Endpoint reported status '{}'",
                health.status
            )));
        }
        Ok(health)
    }

    /// Run the enabled sub-tests in order, then fetch network info
    ///
    /// Never fails: sub-test errors land in the report's `error` field.
    /// Unless `continue_on_error` is set, the first failure ends the run.
    pub async fn run_full_test(&self, options: &TestOptions) -> FullTestReport {
        let span = info_span!(
            "full_test",
            run_id = %Uuid::new_v4(),
            server = %self.client.base_url()
        );
        self.run_steps(options).instrument(span).await
    }

    async fn run_steps(&self, options: &TestOptions) -> FullTestReport {
        let mut report = FullTestReport::new(self.client.base_url());
        info!("Starting speed test against {}", report.server_url);

        if options.test_latency {
            match self.test_latency(options.latency_samples).await {
                Ok(latency) => {
                    info!(
                        "Average: {}ms (min: {}ms, max: {}ms)",
                        latency.average, latency.min, latency.max
                    );
                    report.tests.latency = Some(latency);
                }
                Err(e) => {
                    if Self::stop_after(&mut report, TestPhase::Latency, e, options) {
                        return report;
                    }
                }
            }
        }

        if options.test_download {
            match self.test_download_speed(options.download_size_kb).await {
                Ok(download) => {
                    info!(
                        "Download: {} Mbps ({} Kbps)",
                        download.speed_mbps, download.speed_kbps
                    );
                    report.tests.download = Some(download);
                }
                Err(e) => {
                    if Self::stop_after(&mut report, TestPhase::Download, e, options) {
                        return report;
                    }
                }
            }
        }

        if options.test_upload {
            match self.test_upload_speed(options.upload_size_kb).await {
                Ok(upload) => {
                    info!(
                        "Upload: {} Mbps ({} Kbps)",
                        upload.speed_mbps, upload.speed_kbps
                    );
                    report.tests.upload = Some(upload);
                }
                Err(e) => {
                    if Self::stop_after(&mut report, TestPhase::Upload, e, options) {
                        return report;
                    }
                }
            }
        }

        match self.get_network_info().await {
            Ok(info) => {
                info!("Client IP: {}", info.client_ip);
                report.tests.network_info = Some(info);
            }
            Err(e) => {
                Self::stop_after(&mut report, TestPhase::NetworkInfo, e, options);
            }
        }

        report
    }

    /// Record a failed step; returns true when the run should stop
    fn stop_after(
        report: &mut FullTestReport,
        phase: TestPhase,
        error: AppError,
        options: &TestOptions,
    ) -> bool {
        warn!("{} test failed: {}", phase, error);
        report.record_error(format!("{} test failed: {}", phase, error));
        !options.continue_on_error
    }
}

fn elapsed_millis(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
