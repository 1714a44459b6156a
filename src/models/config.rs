//! Configuration data models and validation

use crate::error::{AppError, Result};
use crate::defaults;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Which sub-tests a full run performs and with what parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOptions {
    pub latency_samples: u32,
    pub download_size_kb: u64,
    pub upload_size_kb: u64,
    pub test_latency: bool,
    pub test_download: bool,
    pub test_upload: bool,
    /// Keep running later sub-tests after one fails
    pub continue_on_error: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            latency_samples: defaults::DEFAULT_PING_COUNT,
            download_size_kb: defaults::DEFAULT_DOWNLOAD_SIZE_KB,
            upload_size_kb: defaults::DEFAULT_UPLOAD_SIZE_KB,
            test_latency: true,
            test_download: true,
            test_upload: true,
            continue_on_error: false,
        }
    }
}

/// Driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Base URL of the measurement endpoint, without trailing slash
    #[serde(default)]
    pub server_url: String,

    #[serde(default = "default_download_size_kb")]
    pub download_size_kb: u64,

    #[serde(default = "default_upload_size_kb")]
    pub upload_size_kb: u64,

    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    #[serde(default = "default_true")]
    pub test_latency: bool,

    #[serde(default = "default_true")]
    pub test_download: bool,

    #[serde(default = "default_true")]
    pub test_upload: bool,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub continue_on_error: bool,

    #[serde(default = "default_true")]
    pub enable_color: bool,

    /// Pretty-print the JSON report
    #[serde(default = "default_true")]
    pub pretty: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            download_size_kb: default_download_size_kb(),
            upload_size_kb: default_upload_size_kb(),
            ping_count: default_ping_count(),
            test_latency: true,
            test_download: true,
            test_upload: true,
            timeout_seconds: default_timeout_secs(),
            continue_on_error: false,
            enable_color: true,
            pretty: true,
            verbose: false,
            debug: false,
        }
    }
}

impl DriverConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Options for `SpeedTester::run_full_test`
    pub fn test_options(&self) -> TestOptions {
        TestOptions {
            latency_samples: self.ping_count,
            download_size_kb: self.download_size_kb,
            upload_size_kb: self.upload_size_kb,
            test_latency: self.test_latency,
            test_download: self.test_download,
            test_upload: self.test_upload,
            continue_on_error: self.continue_on_error,
        }
    }

    /// Strip trailing slashes so paths can be appended directly
    pub fn normalize_server_url(url: &str) -> String {
        url.trim().trim_end_matches('/').to_string()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(AppError::config("Server URL is required"));
        }

        let parsed = url::Url::parse(&self.server_url)
            .map_err(|e| AppError::config(format!("Invalid server URL '{}': {}", self.server_url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::config(format!(
                "Server URL must use http or https: {}",
                self.server_url
            )));
        }

        if parsed.host_str().is_none() {
            return Err(AppError::config(format!("Server URL has no host: {}", self.server_url)));
        }

        if self.ping_count == 0 {
            return Err(AppError::config("Ping count must be greater than 0"));
        }

        if self.ping_count > defaults::MAX_PING_COUNT {
            return Err(AppError::config(format!(
                "Ping count cannot exceed {}",
                defaults::MAX_PING_COUNT
            )));
        }

        if self.download_size_kb == 0 {
            return Err(AppError::config("Download size must be at least 1 KB"));
        }

        if self.upload_size_kb == 0 {
            return Err(AppError::config("Upload size must be at least 1 KB"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > defaults::MAX_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                defaults::MAX_TIMEOUT_SECS
            )));
        }

        Ok(())
    }

    /// Merge values from an arbitrary key lookup
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SPEEDTEST_SERVER_URL") {
            if !url.trim().is_empty() {
                self.server_url = Self::normalize_server_url(&url);
            }
        }

        if let Some(size) = lookup("DOWNLOAD_SIZE_KB") {
            self.download_size_kb = size.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DOWNLOAD_SIZE_KB value '{}': {}", size, e)))?;
        }

        if let Some(size) = lookup("UPLOAD_SIZE_KB") {
            self.upload_size_kb = size.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid UPLOAD_SIZE_KB value '{}': {}", size, e)))?;
        }

        if let Some(count) = lookup("PING_COUNT") {
            self.ping_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", count, e)))?;
        }

        if let Some(timeout) = lookup("REQUEST_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid REQUEST_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest download the endpoint will generate, in KB
    #[serde(default = "default_max_download_kb")]
    pub max_download_kb: u64,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Prefer `X-Forwarded-For` over the socket address
    #[serde(default = "default_true")]
    pub trust_forwarded_for: bool,

    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_download_kb: default_max_download_kb(),
            body_limit_bytes: default_body_limit(),
            trust_forwarded_for: true,
            json_logs: false,
            verbose: false,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_download_kb == 0 {
            return Err(AppError::config("Maximum download size must be at least 1 KB"));
        }

        if self.max_download_kb > defaults::MAX_DOWNLOAD_CEILING_KB {
            return Err(AppError::config(format!(
                "Maximum download size must not exceed {} KB",
                defaults::MAX_DOWNLOAD_CEILING_KB
            )));
        }

        if self.body_limit_bytes < defaults::MIN_BODY_LIMIT_BYTES {
            return Err(AppError::config(format!(
                "Body limit must be at least {} bytes",
                defaults::MIN_BODY_LIMIT_BYTES
            )));
        }

        Ok(())
    }

    /// Merge values from an arbitrary key lookup
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("BIND_ADDRESS") {
            self.bind_address = bind.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BIND_ADDRESS value '{}': {}", bind, e)))?;
        }

        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORT value '{}': {}", port, e)))?;
        }

        if let Some(max) = lookup("MAX_DOWNLOAD_KB") {
            self.max_download_kb = max.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_DOWNLOAD_KB value '{}': {}", max, e)))?;
        }

        if let Some(limit) = lookup("BODY_LIMIT_BYTES") {
            self.body_limit_bytes = limit.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BODY_LIMIT_BYTES value '{}': {}", limit, e)))?;
        }

        if let Some(trust) = lookup("TRUST_FORWARDED_FOR") {
            self.trust_forwarded_for = trust.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TRUST_FORWARDED_FOR value '{}': {}", trust, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_download_size_kb() -> u64 {
    defaults::DEFAULT_DOWNLOAD_SIZE_KB
}

fn default_upload_size_kb() -> u64 {
    defaults::DEFAULT_UPLOAD_SIZE_KB
}

fn default_ping_count() -> u32 {
    defaults::DEFAULT_PING_COUNT
}

fn default_timeout_secs() -> u64 {
    defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_bind_address() -> IpAddr {
    defaults::DEFAULT_BIND_ADDRESS
}

fn default_port() -> u16 {
    defaults::DEFAULT_PORT
}

fn default_max_download_kb() -> u64 {
    defaults::MAX_DOWNLOAD_SIZE_KB
}

fn default_body_limit() -> usize {
    defaults::DEFAULT_BODY_LIMIT_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn valid_driver_config() -> DriverConfig {
        DriverConfig {
            server_url: "http://192.168.1.100:3001".to_string(),
            ..DriverConfig::default()
        }
    }

    #[test]
    fn test_default_test_options() {
        let options = TestOptions::default();
        assert_eq!(options.latency_samples, 5);
        assert_eq!(options.download_size_kb, 1000);
        assert_eq!(options.upload_size_kb, 1000);
        assert!(options.test_latency && options.test_download && options.test_upload);
        assert!(!options.continue_on_error);
    }

    #[test]
    fn test_default_driver_config_needs_url() {
        assert!(DriverConfig::default().validate().is_err());
        assert!(valid_driver_config().validate().is_ok());
        assert_eq!(valid_driver_config().timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_server_urls() {
        for url in ["not-a-url", "ftp://example.com", "file:///tmp/x"] {
            let config = DriverConfig { server_url: url.to_string(), ..DriverConfig::default() };
            assert!(config.validate().is_err(), "{} should be rejected", url);
        }
    }

    #[test]
    fn test_zero_values_invalid() {
        let mut config = valid_driver_config();
        config.ping_count = 0;
        assert!(config.validate().is_err());

        let mut config = valid_driver_config();
        config.download_size_kb = 0;
        assert!(config.validate().is_err());

        let mut config = valid_driver_config();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalize_server_url() {
        assert_eq!(DriverConfig::normalize_server_url("http://host:3001/"), "http://host:3001");
        assert_eq!(DriverConfig::normalize_server_url(" http://host// "), "http://host");
        assert_eq!(DriverConfig::normalize_server_url("http://host"), "http://host");
    }

    #[test]
    fn test_driver_merge_from_lookup() {
        let mut config = DriverConfig::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("SPEEDTEST_SERVER_URL", "http://speed.local:3001/"),
                ("DOWNLOAD_SIZE_KB", "2048"),
                ("PING_COUNT", "10"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();

        assert_eq!(config.server_url, "http://speed.local:3001");
        assert_eq!(config.download_size_kb, 2048);
        assert_eq!(config.upload_size_kb, 1000);
        assert_eq!(config.ping_count, 10);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_driver_merge_rejects_garbage() {
        let mut config = DriverConfig::default();
        let result = config.merge_from_lookup(lookup_from(&[("PING_COUNT", "many")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_test_options_from_config() {
        let mut config = valid_driver_config();
        config.test_download = false;
        config.ping_count = 3;
        let options = config.test_options();
        assert!(!options.test_download);
        assert_eq!(options.latency_samples, 3);
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.max_download_kb, 10240);
        assert_eq!(config.body_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3001");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_merge_from_lookup() {
        let mut config = ServerConfig::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("PORT", "8080"),
                ("BIND_ADDRESS", "127.0.0.1"),
                ("TRUST_FORWARDED_FOR", "false"),
            ]))
            .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert!(!config.trust_forwarded_for);

        let result = config.merge_from_lookup(lookup_from(&[("PORT", "99999")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_server_validation() {
        let config = ServerConfig { max_download_kb: 0, ..ServerConfig::default() };
        assert!(config.validate().is_err());

        let config = ServerConfig { body_limit_bytes: 10, ..ServerConfig::default() };
        assert!(config.validate().is_err());

        let config = ServerConfig { max_download_kb: u64::MAX, ..ServerConfig::default() };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_download_kb: defaults::MAX_DOWNLOAD_CEILING_KB,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
