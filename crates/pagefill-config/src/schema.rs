//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::loader::ConfigLoader;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.models.iter().all(|model| model.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "gemini.models".to_string(),
                message: "must list at least one model".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "gemini.temperature".to_string(),
                message: format!("{} is outside 0.0..=2.0", self.gemini.temperature),
            });
        }
        if self.gemini.max_output_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gemini.max_output_tokens".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !self.browser.endpoint.starts_with("http://") && !self.browser.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "browser.endpoint".to_string(),
                message: format!("'{}' is not an http(s) URL", self.browser.endpoint),
            });
        }
        Ok(())
    }
}

/// Remote generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Candidate model identifiers, most preferred first.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: default_models(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1".to_string()
}

fn default_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".to_string(),
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
        "gemini-pro".to_string(),
    ]
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    250
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

/// Browser (CDP) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Substring of the URL or title of the tab to attach to. The first page
    /// target is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            target: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:9222".to_string()
}

/// Credential storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Storage file path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.path))
    }
}

fn default_storage_path() -> String {
    "~/.pagefill/storage.json".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_log_dir(),
        }
    }
}

impl LoggingConfig {
    /// Log directory with `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(ConfigLoader::expand_path(&self.dir))
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.pagefill/logs".to_string()
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pagefill")
        .join("config.toml")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
