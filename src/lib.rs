//! Network Speed Tester
//!
//! An HTTP speed tester in two halves: a measurement endpoint that answers
//! ping, download, upload and network-info requests, and a measurement
//! driver that times those requests and reports latency and throughput.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod payload;
pub mod server;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use client::{HttpClient, ReqwestClient};
pub use driver::SpeedTester;
pub use error::{AppError, Result};
pub use models::{DriverConfig, FullTestReport, LatencyResult, NetworkInfo, ServerConfig, TestOptions, TransferResult};
pub use output::{ColoredFormatter, OutputFormatter, PlainFormatter};
pub use server::{build_router, HttpServer};
pub use stats::{LatencySampler, TransferRate};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata captured by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// One-line description of this build
pub fn build_info() -> String {
    match GIT_COMMIT {
        Some(commit) => format!("{} v{} ({}, {}, built {})", PKG_NAME, VERSION, commit, TARGET_TRIPLE, BUILD_TIME),
        None => format!("{} v{} ({}, built {})", PKG_NAME, VERSION, TARGET_TRIPLE, BUILD_TIME),
    }
}

/// Default configuration values
pub mod defaults {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    pub const DEFAULT_PING_COUNT: u32 = 5;
    pub const DEFAULT_DOWNLOAD_SIZE_KB: u64 = 1000;
    pub const DEFAULT_UPLOAD_SIZE_KB: u64 = 1000;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
    pub const PING_INTERVAL: Duration = Duration::from_millis(100);
    pub const MAX_PING_COUNT: u32 = 1000;
    pub const MAX_TIMEOUT_SECS: u64 = 600;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    pub const DEFAULT_PORT: u16 = 3001;
    pub const MAX_DOWNLOAD_SIZE_KB: u64 = 10240;
    /// Largest configurable download cap (1 GiB)
    pub const MAX_DOWNLOAD_CEILING_KB: u64 = 1024 * 1024;
    pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;
    pub const MIN_BODY_LIMIT_BYTES: usize = 1024;
}
