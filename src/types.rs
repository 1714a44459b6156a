//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Sub-tests of a full run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestPhase {
    Latency,
    Download,
    Upload,
    NetworkInfo,
}

impl TestPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TestPhase::Latency => "latency",
            TestPhase::Download => "download",
            TestPhase::Upload => "upload",
            TestPhase::NetworkInfo => "network-info",
        }
    }
}

impl fmt::Display for TestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current wall clock in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
