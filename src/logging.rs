//! Structured logging setup for the speed tester binaries
//!
//! Both binaries log through `tracing`. This module maps the CLI verbosity
//! flags onto a level and output format and installs a `tracing-subscriber`
//! fmt layer writing to stderr, so stdout stays reserved for the JSON report.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::config(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// Resolved logging settings for one process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub use_color: bool,
}

impl LogSettings {
    /// Settings for the driver: quiet unless asked otherwise
    pub fn for_driver(verbose: bool, debug: bool, use_color: bool) -> Self {
        let (level, format) = if debug {
            (LogLevel::Debug, LogFormat::Json)
        } else if verbose {
            (LogLevel::Info, LogFormat::Console)
        } else {
            (LogLevel::Warn, LogFormat::Compact)
        };

        Self { level, format, use_color }
    }

    /// Settings for the endpoint: request logging on by default
    pub fn for_server(verbose: bool, debug: bool, json: bool) -> Self {
        let level = if debug {
            LogLevel::Trace
        } else if verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        Self {
            level,
            format: if json { LogFormat::Json } else { LogFormat::Console },
            use_color: !json,
        }
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn env_filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::builder()
                .with_default_directive(self.level.as_filter().into())
                .parse_lossy("")
        }
    }
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber was already installed for this process.
pub fn init_logging(settings: LogSettings) -> Result<()> {
    let registry = tracing_subscriber::registry().with(settings.env_filter());

    let installed = match settings.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true),
            )
            .try_init(),
        LogFormat::Console => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(settings.use_color)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_ansi(settings.use_color)
                    .with_target(false),
            )
            .try_init(),
    };

    installed.map_err(|e| AppError::internal(format!("Failed to install logger: {}", e)))
}
