//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{supports_color, Cli, ServerCli},
    config::env::EnvManager,
    error::Result,
    models::{DriverConfig, ServerConfig},
};

/// Combines defaults, .env, environment and CLI arguments into a [`DriverConfig`]
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<DriverConfig> {
        EnvManager::load_env_file(self.cli.env_file.as_deref())?;
        self.parse_with(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an explicit variable lookup
    pub fn parse_with<F>(&self, lookup: F) -> Result<DriverConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DriverConfig {
            enable_color: supports_color(),
            ..DriverConfig::default()
        };

        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut DriverConfig) {
        let cli = &self.cli;

        if let Some(ref url) = cli.url {
            config.server_url = DriverConfig::normalize_server_url(url);
        }
        if let Some(size) = cli.download_size {
            config.download_size_kb = size;
        }
        if let Some(size) = cli.upload_size {
            config.upload_size_kb = size;
        }
        if let Some(count) = cli.ping_count {
            config.ping_count = count;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(color) = cli.color_override() {
            config.enable_color = color;
        }

        // CLI-only settings
        config.test_latency = !cli.no_latency;
        config.test_download = !cli.no_download;
        config.test_upload = !cli.no_upload;
        config.continue_on_error = cli.continue_on_error;
        config.pretty = !cli.compact;
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Combines defaults, .env, environment and CLI arguments into a [`ServerConfig`]
pub struct ServerConfigParser {
    cli: ServerCli,
}

impl ServerConfigParser {
    pub fn new(cli: ServerCli) -> Self {
        Self { cli }
    }

    pub fn parse(&self) -> Result<ServerConfig> {
        EnvManager::load_env_file(self.cli.env_file.as_deref())?;
        self.parse_with(|key| std::env::var(key).ok())
    }

    pub fn parse_with<F>(&self, lookup: F) -> Result<ServerConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();
        config.merge_from_lookup(lookup)?;

        let cli = &self.cli;
        if let Some(bind) = cli.bind {
            config.bind_address = bind;
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(max) = cli.max_download_kb {
            config.max_download_kb = max;
        }
        if let Some(limit) = cli.body_limit {
            config.body_limit_bytes = limit;
        }
        if cli.no_forwarded_for {
            config.trust_forwarded_for = false;
        }
        config.json_logs = cli.json_logs;
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        config.validate()?;
        Ok(config)
    }
}

/// Convenience function to load the driver configuration from CLI arguments
pub fn load_driver_config(cli: Cli) -> Result<DriverConfig> {
    ConfigParser::new(cli).parse()
}

/// Convenience function to load the endpoint configuration from CLI arguments
pub fn load_server_config(cli: ServerCli) -> Result<ServerConfig> {
    ServerConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &DriverConfig) -> String {
    let enabled: Vec<&str> = [
        (config.test_latency, "latency"),
        (config.test_download, "download"),
        (config.test_upload, "upload"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();

    let summary = [
        format!("Server URL: {}", config.server_url),
        format!("Tests: {}", enabled.join(", ")),
        format!("Ping Count: {}", config.ping_count),
        format!("Download Size: {}KB", config.download_size_kb),
        format!("Upload Size: {}KB", config.upload_size_kb),
        format!("Timeout: {}s", config.timeout_seconds),
        format!("Continue On Error: {}", config.continue_on_error),
        format!("Color Output: {}", config.enable_color),
    ];

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_positional_url() {
        let cli = Cli::parse_from(["nst", "http://localhost:3001/"]);
        let config = ConfigParser::new(cli).parse_with(env_of(&[])).unwrap();

        assert_eq!(config.server_url, "http://localhost:3001");
        assert_eq!(config.ping_count, crate::defaults::DEFAULT_PING_COUNT);
        assert_eq!(config.download_size_kb, crate::defaults::DEFAULT_DOWNLOAD_SIZE_KB);
        assert_eq!(config.upload_size_kb, crate::defaults::DEFAULT_UPLOAD_SIZE_KB);
        assert_eq!(config.timeout_seconds, crate::defaults::DEFAULT_TIMEOUT.as_secs());
        assert!(config.test_latency && config.test_download && config.test_upload);
        assert!(!config.continue_on_error);
        assert!(config.pretty);
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let cli = Cli::parse_from(["nst"]);
        let error = ConfigParser::new(cli).parse_with(env_of(&[])).unwrap_err();
        assert!(error.to_string().contains("Server URL is required"));
    }

    #[test]
    fn test_env_supplies_url_and_sizes() {
        let cli = Cli::parse_from(["nst"]);
        let config = ConfigParser::new(cli)
            .parse_with(env_of(&[
                ("SPEEDTEST_SERVER_URL", "https://speed.example.com/"),
                ("DOWNLOAD_SIZE_KB", "2048"),
                ("PING_COUNT", "7"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();

        assert_eq!(config.server_url, "https://speed.example.com");
        assert_eq!(config.download_size_kb, 2048);
        assert_eq!(config.ping_count, 7);
        assert!(!config.enable_color);
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let cli = Cli::parse_from([
            "nst",
            "http://cli.example.com",
            "--ping-count", "12",
            "--color",
            "--no-upload",
            "--compact",
        ]);
        let config = ConfigParser::new(cli)
            .parse_with(env_of(&[
                ("SPEEDTEST_SERVER_URL", "http://env.example.com"),
                ("PING_COUNT", "8"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();

        assert_eq!(config.server_url, "http://cli.example.com");
        assert_eq!(config.ping_count, 12);
        assert!(config.enable_color);
        assert!(!config.test_upload);
        assert!(!config.pretty);
    }

    #[test]
    fn test_invalid_env_value_is_error() {
        let cli = Cli::parse_from(["nst", "http://h"]);
        assert!(ConfigParser::new(cli)
            .parse_with(env_of(&[("UPLOAD_SIZE_KB", "lots")]))
            .is_err());
    }

    #[test]
    fn test_out_of_range_values_fail_validation() {
        let cli = Cli::parse_from(["nst", "http://h", "--ping-count", "0"]);
        assert!(ConfigParser::new(cli).parse_with(env_of(&[])).is_err());

        let cli = Cli::parse_from(["nst", "http://h"]);
        assert!(ConfigParser::new(cli)
            .parse_with(env_of(&[("REQUEST_TIMEOUT_SECONDS", "601")]))
            .is_err());

        let cli = Cli::parse_from(["nst", "ftp://h"]);
        assert!(ConfigParser::new(cli).parse_with(env_of(&[])).is_err());
    }

    #[test]
    fn test_server_config_layering() {
        let cli = ServerCli::parse_from(["nst-server", "--port", "9000", "--no-forwarded-for"]);
        let config = ServerConfigParser::new(cli)
            .parse_with(env_of(&[("PORT", "8000"), ("MAX_DOWNLOAD_KB", "2048")]))
            .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.max_download_kb, 2048);
        assert!(!config.trust_forwarded_for);
        assert_eq!(config.bind_address, crate::defaults::DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_server_config_rejects_tiny_body_limit() {
        let cli = ServerCli::parse_from(["nst-server", "--body-limit", "10"]);
        assert!(ServerConfigParser::new(cli).parse_with(env_of(&[])).is_err());
    }

    #[test]
    fn test_config_summary() {
        let config = DriverConfig {
            server_url: "http://localhost:3001".to_string(),
            test_upload: false,
            ..DriverConfig::default()
        };
        let summary = display_config_summary(&config);

        assert!(summary.contains("Server URL: http://localhost:3001"));
        assert!(summary.contains("Tests: latency, download"));
        assert!(summary.contains("Timeout: 120s"));
    }
}
