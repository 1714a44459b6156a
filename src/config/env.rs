//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load a .env file if it exists
    ///
    /// Variables already present in the process environment are kept, so
    /// the file only fills in what the environment leaves unset. An explicit
    /// `path` that does not exist is an error; the implicit `./.env` is
    /// optional. Returns whether a file was loaded.
    pub fn load_env_file(path: Option<&Path>) -> Result<bool> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(".env"), false),
        };

        if !path.exists() {
            if explicit {
                return Err(AppError::config(format!("Env file not found: {}", path.display())));
            }
            debug!("No .env file found, using defaults and CLI arguments");
            return Ok(false);
        }

        dotenv::from_path(&path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Network Speed Tester Configuration
#
# Values here are defaults; the process environment and command-line
# arguments override them.

# --- driver (nst) ---

# Base URL of the speed test server
# SPEEDTEST_SERVER_URL=http://localhost:3001

# Transfer sizes in KB
# DOWNLOAD_SIZE_KB=1000
# UPLOAD_SIZE_KB=1000

# Number of latency samples (1-1000)
# PING_COUNT=5

# Per-request timeout in seconds (1-600)
# REQUEST_TIMEOUT_SECONDS=120

# Enable colored output (true/false)
# ENABLE_COLOR=true

# --- server (nst-server) ---

# BIND_ADDRESS=0.0.0.0
# PORT=3001
# MAX_DOWNLOAD_KB=10240
# BODY_LIMIT_BYTES=52428800
# TRUST_FORWARDED_FOR=true
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "SPEEDTEST_SERVER_URL" => {
                url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_SERVER_URL value '{}': {}", value, e)))?;
            }
            "DOWNLOAD_SIZE_KB" | "UPLOAD_SIZE_KB" | "MAX_DOWNLOAD_KB" => {
                let size: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if size == 0 {
                    return Err(AppError::config(format!("{} must be at least 1", key)));
                }
            }
            "PING_COUNT" => {
                let count: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > crate::defaults::MAX_PING_COUNT {
                    return Err(AppError::config(format!(
                        "PING_COUNT must be between 1 and {}, got: {}",
                        crate::defaults::MAX_PING_COUNT,
                        count
                    )));
                }
            }
            "REQUEST_TIMEOUT_SECONDS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid REQUEST_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > crate::defaults::MAX_TIMEOUT_SECS {
                    return Err(AppError::config(format!(
                        "REQUEST_TIMEOUT_SECONDS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_TIMEOUT_SECS,
                        timeout
                    )));
                }
            }
            "ENABLE_COLOR" | "TRUST_FORWARDED_FOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "BIND_ADDRESS" => {
                value.parse::<std::net::IpAddr>()
                    .map_err(|e| AppError::config(format!("Invalid BIND_ADDRESS value '{}': {}", value, e)))?;
            }
            "PORT" => {
                value.parse::<u16>()
                    .map_err(|e| AppError::config(format!("Invalid PORT value '{}': {}", value, e)))?;
            }
            "BODY_LIMIT_BYTES" => {
                value.parse::<usize>()
                    .map_err(|e| AppError::config(format!("Invalid BODY_LIMIT_BYTES value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDTEST_SERVER_URL", "Base URL of the speed test server", "http://localhost:3001"),
            ("DOWNLOAD_SIZE_KB", "Download test size in KB", "1000"),
            ("UPLOAD_SIZE_KB", "Upload test size in KB", "1000"),
            ("PING_COUNT", "Number of latency samples (1-1000)", "5"),
            ("REQUEST_TIMEOUT_SECONDS", "Per-request timeout in seconds (1-600)", "120"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("BIND_ADDRESS", "Server: address to bind", "0.0.0.0"),
            ("PORT", "Server: port to listen on", "3001"),
            ("MAX_DOWNLOAD_KB", "Server: largest download in KB", "10240"),
            ("BODY_LIMIT_BYTES", "Server: largest request body in bytes", "52428800"),
            ("TRUST_FORWARDED_FOR", "Server: report the X-Forwarded-For client address", "true"),
        ]
    }

    /// Validate the supported variables found through `lookup`
    pub fn validate_with<F>(lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = lookup(var_name)?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Check a .env file's contents without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().trim_start_matches("export ").trim();
                let value = value.trim().trim_matches('"');

                if let Err(e) = Self::validate_env_var(key, value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_manager_create_example_content() {
        let content = EnvManager::create_example_env_content();

        for (var_name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", var_name)), "missing {}", var_name);
        }
    }

    #[test]
    fn test_env_manager_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Network Speed Tester Configuration"));
    }

    #[test]
    fn test_env_manager_validate_env_var() {
        assert!(EnvManager::validate_env_var("SPEEDTEST_SERVER_URL", "http://localhost:3001").is_ok());
        assert!(EnvManager::validate_env_var("DOWNLOAD_SIZE_KB", "1000").is_ok());
        assert!(EnvManager::validate_env_var("PING_COUNT", "1000").is_ok());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_SECONDS", "600").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("BIND_ADDRESS", "::").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "whatever").is_ok());

        assert!(EnvManager::validate_env_var("SPEEDTEST_SERVER_URL", "localhost").is_err());
        assert!(EnvManager::validate_env_var("UPLOAD_SIZE_KB", "0").is_err());
        assert!(EnvManager::validate_env_var("PING_COUNT", "1001").is_err());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_SECONDS", "0").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("PORT", "70000").is_err());
    }

    #[test]
    fn test_validate_with_collects_warnings() {
        let env: HashMap<&str, &str> = [("PING_COUNT", "0"), ("PORT", "3001")].into_iter().collect();
        let warnings = EnvManager::validate_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("PING_COUNT"));
    }

    #[test]
    fn test_check_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "PING_COUNT=5").unwrap();
        writeln!(file, "export DOWNLOAD_SIZE_KB=abc").unwrap();

        let warnings = EnvManager::check_env_file(file.path()).unwrap().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("DOWNLOAD_SIZE_KB"));

        let missing = file.path().with_extension("missing");
        assert!(EnvManager::check_env_file(&missing).unwrap().is_none());
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EnvManager::load_env_file(Some(&dir.path().join("nope.env")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_env_file_sets_unset_variables() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "NST_TEST_ONLY_LOADED_VALUE=42").unwrap();

        assert!(EnvManager::load_env_file(Some(file.path())).unwrap());
        assert_eq!(std::env::var("NST_TEST_ONLY_LOADED_VALUE").unwrap(), "42");
        std::env::remove_var("NST_TEST_ONLY_LOADED_VALUE");
    }
}
