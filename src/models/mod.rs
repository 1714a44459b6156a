//! Data models and structures for the network speed tester

pub mod api;
pub mod config;
pub mod metrics;

// Re-export main model types
pub use api::{
    DownloadResponse, EchoedHeaders, ErrorResponse, HealthResponse, NetworkInfo, PingResponse,
    UploadPayload, UploadRequest, UploadResponse,
};
pub use config::{DriverConfig, ServerConfig, TestOptions};
pub use metrics::{FullTestReport, LatencyResult, TestResults, TransferResult};
