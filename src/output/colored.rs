//! Colored formatter implementation with terminal color support

use super::formatter::{phase_label, FormattingOptions, OutputFormatter};
use crate::{
    error::Result,
    models::{
        api::NetworkInfo,
        metrics::{LatencyResult, TransferResult},
    },
    types::TestPhase,
};
use colored::*;
use std::fmt::Write as _;

/// Performance level classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl PerformanceLevel {
    /// Classify a round trip time in milliseconds
    pub fn from_latency_ms(time_ms: u64) -> Self {
        match time_ms {
            0..=49 => Self::Excellent,
            50..=99 => Self::Good,
            100..=299 => Self::Fair,
            300..=999 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }

    /// Classify a throughput in megabits per second
    pub fn from_speed_mbps(mbps: f64) -> Self {
        if mbps >= 100.0 {
            Self::Excellent
        } else if mbps >= 25.0 {
            Self::Good
        } else if mbps >= 5.0 {
            Self::Fair
        } else if mbps >= 1.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub label: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            label: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Colored and bold, or plain when colors are disabled
    fn strong(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn label(&self, phase: TestPhase) -> ColoredString {
        self.colorize(&format!("{:<10}", phase_label(phase)), self.color_scheme.label)
    }

    fn rated(&self, text: &str, level: PerformanceLevel) -> String {
        format!(
            "{} {}",
            self.strong(text, level.color()),
            self.colorize(&format!("[{}]", level.description()), self.color_scheme.muted)
        )
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let rule = "=".repeat(title.chars().count());
        Ok(format!(
            "{}\n{}",
            self.strong(title, self.color_scheme.header),
            self.colorize(&rule, self.color_scheme.muted)
        ))
    }

    fn format_latency(&self, latency: &LatencyResult) -> Result<String> {
        let level = PerformanceLevel::from_latency_ms(latency.average);
        Ok(format!(
            "  {} {} {}",
            self.label(TestPhase::Latency),
            self.rated(&format!("{}ms avg", latency.average), level),
            self.colorize(
                &format!("(min {}ms, max {}ms, {} samples)", latency.min, latency.max, latency.n_samples),
                self.color_scheme.muted
            )
        ))
    }

    fn format_transfer(&self, phase: TestPhase, transfer: &TransferResult) -> Result<String> {
        let level = PerformanceLevel::from_speed_mbps(transfer.speed_mbps);
        let mut line = format!(
            "  {} {} {}",
            self.label(phase),
            self.rated(&format!("{:.2} Mbps", transfer.speed_mbps), level),
            self.colorize(&format!("({} Kbps)", transfer.speed_kbps), self.color_scheme.muted)
        );

        if self.options.verbose_mode {
            let mut details = format!("{}KB in {}ms", transfer.size_kb, transfer.transfer_time_ms);
            if let Some(requested) = transfer.requested_size_kb {
                write!(details, ", {}KB requested", requested)?;
            }
            if let Some(server_time) = transfer.server_processing_time {
                write!(details, ", server saw {}ms", server_time)?;
            }
            write!(line, " {}", self.colorize(&format!("- {}", details), self.color_scheme.muted))?;
        }

        Ok(line)
    }

    fn format_network_info(&self, info: &NetworkInfo) -> Result<String> {
        let mut output = format!(
            "  {} client IP {}",
            self.label(TestPhase::NetworkInfo),
            self.strong(&info.client_ip, Color::White)
        );

        if self.options.verbose_mode {
            let headers = [
                ("user-agent", info.headers.user_agent.as_deref()),
                ("connection", info.headers.connection.as_deref()),
                ("accept-encoding", info.headers.accept_encoding.as_deref()),
            ];
            for (name, value) in headers {
                if let Some(value) = value {
                    write!(
                        output,
                        "\n  {:<10} {} {}",
                        "",
                        self.colorize(name, self.color_scheme.muted),
                        value
                    )?;
                }
            }
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.strong("✗", self.color_scheme.error), self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.strong("!", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.strong("✓", self.color_scheme.success), message))
    }
}
