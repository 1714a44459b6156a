//! Command-line interfaces of the driver and endpoint binaries

pub mod help;

pub use help::HelpSystem;

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Network Speed Tester - measure latency and throughput against a speed test server
#[derive(Parser, Debug, Clone)]
#[command(name = "nst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the speed test server (falls back to SPEEDTEST_SERVER_URL)
    #[arg(value_name = "SERVER_URL")]
    pub url: Option<String>,

    /// Download test size in KB
    #[arg(short = 'd', long)]
    pub download_size: Option<u64>,

    /// Upload test size in KB
    #[arg(short = 'u', long)]
    pub upload_size: Option<u64>,

    /// Number of latency samples
    #[arg(short = 'p', long)]
    pub ping_count: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Skip the latency test
    #[arg(long)]
    pub no_latency: bool,

    /// Skip the download test
    #[arg(long)]
    pub no_download: bool,

    /// Skip the upload test
    #[arg(long)]
    pub no_upload: bool,

    /// Keep running the remaining tests after one fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the JSON report on a single line
    #[arg(long)]
    pub compact: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Show help for specific topic (config, endpoints, examples, output)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        Ok(())
    }

    /// Explicit color choice from the flags, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }

    pub fn should_show_topic_help(&self) -> bool {
        self.help_topic.is_some()
    }

    /// Display help for the specified topic or main help
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        if let Some(topic) = &self.help_topic {
            help_system.display_topic_help(topic, use_colors)
                .unwrap_or_else(|| {
                    format!("Unknown help topic: '{}'\n\nAvailable topics: config, endpoints, examples, output\n\n{}",
                        topic, help_system.display_main_help(use_colors))
                })
        } else {
            help_system.display_main_help(use_colors)
        }
    }
}

/// Network Speed Tester server - answer latency, download and upload measurements
#[derive(Parser, Debug, Clone)]
#[command(name = "nst-server")]
#[command(version, about, long_about = None)]
pub struct ServerCli {
    /// Address to bind
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Largest download the server will generate, in KB
    #[arg(long)]
    pub max_download_kb: Option<u64>,

    /// Largest accepted request body, in bytes
    #[arg(long)]
    pub body_limit: Option<usize>,

    /// Ignore X-Forwarded-For when reporting the client address
    #[arg(long)]
    pub no_forwarded_for: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    let max = crate::defaults::MAX_TIMEOUT_SECS;
    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > max {
                Err(format!("Duration cannot exceed {} seconds", max))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
