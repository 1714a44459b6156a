//! Advisory checks on a driver configuration
//!
//! [`DriverConfig::validate`](crate::models::DriverConfig::validate) rejects
//! configurations that cannot run. The checks here only produce warnings
//! about configurations that run but may measure poorly.

use crate::{
    defaults,
    error::{AppError, Result},
    models::DriverConfig,
    payload,
};
use colored::*;

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration, returning warnings for a runnable one
    pub fn validate_comprehensive(config: &DriverConfig) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_server_url(&config.server_url)?);
        warnings.extend(Self::validate_transfer_sizes(config));
        warnings.extend(Self::validate_performance_settings(config));

        Ok(warnings)
    }

    fn validate_server_url(url: &str) -> Result<Vec<ValidationWarning>> {
        let parsed = url::Url::parse(url)
            .map_err(|e| AppError::config(format!("Invalid URL '{}': {}", url, e)))?;
        let mut warnings = Vec::new();

        if parsed.scheme() == "http" && !is_local_host(&parsed) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Server URL '{}' uses plain HTTP; proxies on the path may alter transfers", url),
            ));
        }

        if !parsed.path().is_empty() && parsed.path() != "/" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Server URL '{}' includes path '{}'; endpoints are resolved below it", url, parsed.path()),
            ));
        }

        if parsed.query().is_some() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Server URL '{}' includes a query string, which is not forwarded to endpoints", url),
            ));
        }

        Ok(warnings)
    }

    fn validate_transfer_sizes(config: &DriverConfig) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !config.test_latency && !config.test_download && !config.test_upload {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Latency, download and upload are all disabled; only network info will be fetched".to_string(),
            ));
        }

        if config.test_download && config.download_size_kb > defaults::MAX_DOWNLOAD_SIZE_KB {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Download size {}KB exceeds the default server cap of {}KB; the server may send less",
                    config.download_size_kb,
                    defaults::MAX_DOWNLOAD_SIZE_KB
                ),
            ));
        }

        if config.test_upload {
            let encoded = payload::encoded_len(config.upload_size_kb);
            if encoded > defaults::DEFAULT_BODY_LIMIT_BYTES as u64 {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "Upload of {}KB encodes to {} bytes, above the default server body limit of {} bytes",
                        config.upload_size_kb,
                        encoded,
                        defaults::DEFAULT_BODY_LIMIT_BYTES
                    ),
                ));
            } else if config.upload_size_kb > defaults::MAX_DOWNLOAD_SIZE_KB {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Large upload of {}KB is held in memory while it is sent", config.upload_size_kb),
                ));
            }
        }

        warnings
    }

    fn validate_performance_settings(config: &DriverConfig) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.test_latency && config.ping_count < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Ping count of {} may not provide reliable statistics (recommended: >= 3)", config.ping_count),
            ));
        } else if config.ping_count > 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("High ping count of {} adds about {}s of pauses", config.ping_count, config.ping_count / 10),
            ));
        }

        if config.timeout_seconds < 5 && (config.test_download || config.test_upload) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}s may cut off bulk transfers on slow links", config.timeout_seconds),
            ));
        }

        warnings
    }
}

fn is_local_host(url: &url::Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback() || ip.is_private(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            let tag = match self.level {
                ValidationLevel::Info => tag.blue(),
                ValidationLevel::Warning => tag.yellow(),
            };
            format!("{} {}", tag, self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &DriverConfig) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(url: &str) -> DriverConfig {
        DriverConfig {
            server_url: url.to_string(),
            ..DriverConfig::default()
        }
    }

    #[test]
    fn test_validation_warning() {
        let warning = ValidationWarning::new(ValidationLevel::Warning, "Test warning message".to_string());

        let formatted = warning.format(false);
        assert_eq!(formatted, "[WARNING] Test warning message");
    }

    #[test]
    fn test_default_config_against_https_is_clean() {
        let warnings = validate_config(&config_for("https://speed.example.com")).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_local_http_is_not_flagged() {
        let warnings = validate_config(&config_for("http://localhost:3001")).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);

        let warnings = validate_config(&config_for("http://192.168.1.10:3001")).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn test_remote_plain_http_warns() {
        let warnings = validate_config(&config_for("http://speed.example.com")).unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.level == ValidationLevel::Warning && w.message.contains("plain HTTP")));
    }

    #[test]
    fn test_download_above_server_cap_warns() {
        let config = DriverConfig {
            download_size_kb: 20_000,
            ..config_for("https://speed.example.com")
        };
        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.message.contains("server cap")));
    }

    #[test]
    fn test_upload_above_body_limit_warns() {
        let config = DriverConfig {
            upload_size_kb: 40_000,
            ..config_for("https://speed.example.com")
        };
        let warnings = validate_config(&config).unwrap();
        assert!(warnings.iter().any(|w| w.message.contains("body limit")));
    }

    #[test]
    fn test_low_ping_count_warns_only_when_latency_runs() {
        let config = DriverConfig {
            ping_count: 1,
            ..config_for("https://speed.example.com")
        };
        assert!(!validate_config(&config).unwrap().is_empty());

        let config = DriverConfig { test_latency: false, ..config };
        assert!(validate_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_all_tests_disabled_is_informational() {
        let config = DriverConfig {
            test_latency: false,
            test_download: false,
            test_upload: false,
            ..config_for("https://speed.example.com")
        };
        let warnings = validate_config(&config).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Info);
        assert!(warnings[0].message.contains("only network info"));
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(validate_config(&config_for("")).is_err());
    }
}
