use std::path::Path;

use serde::{Deserialize, Serialize};

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server listen configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Backend CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Program invoked once per request in headless mode.
    #[serde(default = "default_backend_command")]
    pub command: String,
    /// Optional hard deadline for one invocation, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            command: default_backend_command(),
            timeout_secs: None,
        }
    }
}

/// Synthetic streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Characters per `text_delta` event. Only affects perceived
    /// granularity, never content.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

/// Feature toggles and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8082
}
fn default_backend_command() -> String {
    "claude".to_string()
}
fn default_chunk_size() -> usize {
    20
}
fn default_log_level() -> String {
    "INFO".to_string()
}

/// Load configuration from a YAML file.
///
/// A missing file yields the full defaults so the proxy runs with zero
/// configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file exists but cannot be read,
/// parsed, or validated.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&raw)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.backend.command.trim().is_empty() {
        return Err(ConfigError::Validation(
            "backend.command must not be empty".to_string(),
        ));
    }
    if config.streaming.chunk_size == 0 {
        return Err(ConfigError::Validation(
            "streaming.chunk_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}
