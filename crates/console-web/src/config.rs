//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Console server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Path of the operator settings file.
    pub settings_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CONSOLE_ADDR` | Server bind address | `127.0.0.1:8787` |
    /// | `SETTINGS_PATH` | Operator settings file | `console_settings.json` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("CONSOLE_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8787".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let settings_path = env::var("SETTINGS_PATH")
            .unwrap_or_else(|_| "console_settings.json".to_string());

        Ok(Self {
            addr,
            settings_path,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CONSOLE_ADDR format")]
    InvalidAddr,
}
