//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation.

use crate::{
    error::Result,
    models::{
        api::NetworkInfo,
        metrics::{FullTestReport, LatencyResult, TransferResult},
    },
    types::TestPhase,
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the latency line
    fn format_latency(&self, latency: &LatencyResult) -> Result<String>;

    /// Format a download or upload line
    fn format_transfer(&self, phase: TestPhase, transfer: &TransferResult) -> Result<String>;

    /// Format the network info lines
    fn format_network_info(&self, info: &NetworkInfo) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;

    /// Format the whole report summary
    fn format_report(&self, report: &FullTestReport) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.format_header(&format!("Speed Test Results - {}", report.server_url))?);
        output.push('\n');

        let tests = &report.tests;
        if let Some(ref latency) = tests.latency {
            output.push_str(&self.format_latency(latency)?);
            output.push('\n');
        }
        if let Some(ref download) = tests.download {
            output.push_str(&self.format_transfer(TestPhase::Download, download)?);
            output.push('\n');
        }
        if let Some(ref upload) = tests.upload {
            output.push_str(&self.format_transfer(TestPhase::Upload, upload)?);
            output.push('\n');
        }
        if let Some(ref info) = tests.network_info {
            output.push_str(&self.format_network_info(info)?);
            output.push('\n');
        }

        match report.error {
            Some(ref error) => output.push_str(&self.format_error(error)?),
            None => output.push_str(&self.format_success("All tests completed")?),
        }
        output.push('\n');

        Ok(output)
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show request details such as transfer times and echoed headers
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }
}

/// Left column label for a sub-test line
pub(crate) fn phase_label(phase: TestPhase) -> &'static str {
    match phase {
        TestPhase::Latency => "Latency:",
        TestPhase::Download => "Download:",
        TestPhase::Upload => "Upload:",
        TestPhase::NetworkInfo => "Network:",
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        Ok(format!("{}\n{}", title, "=".repeat(title.chars().count())))
    }

    fn format_latency(&self, latency: &LatencyResult) -> Result<String> {
        Ok(format!(
            "  {:<10} {}ms avg (min {}ms, max {}ms, {} samples)",
            phase_label(TestPhase::Latency),
            latency.average,
            latency.min,
            latency.max,
            latency.n_samples
        ))
    }

    fn format_transfer(&self, phase: TestPhase, transfer: &TransferResult) -> Result<String> {
        let mut line = format!(
            "  {:<10} {:.2} Mbps ({} Kbps)",
            phase_label(phase),
            transfer.speed_mbps,
            transfer.speed_kbps
        );

        if self.options.verbose_mode {
            write!(line, " - {}KB in {}ms", transfer.size_kb, transfer.transfer_time_ms)?;
            if let Some(requested) = transfer.requested_size_kb {
                write!(line, ", {}KB requested", requested)?;
            }
            if let Some(server_time) = transfer.server_processing_time {
                write!(line, ", server saw {}ms", server_time)?;
            }
        }

        Ok(line)
    }

    fn format_network_info(&self, info: &NetworkInfo) -> Result<String> {
        let mut output = format!("  {:<10} client IP {}", phase_label(TestPhase::NetworkInfo), info.client_ip);

        if self.options.verbose_mode {
            if let Some(ref agent) = info.headers.user_agent {
                write!(output, "\n  {:<10} user-agent {}", "", agent)?;
            }
            if let Some(ref encoding) = info.headers.accept_encoding {
                write!(output, "\n  {:<10} accept-encoding {}", "", encoding)?;
            }
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("OK: {}", message))
    }
}
