//! Logger configuration.
//!
//! Loaded from TOML, then overridden from `RASK_LOG_CLIENT_*` environment
//! variables, then validated:
//!
//! ```toml
//! service = "checkout-web"
//! endpoint = "https://logs.example.com/v1/events"
//! auto_flush_levels = ["error"]
//! timeout = 10000            # milliseconds
//!
//! [errors]
//! exposeOwnProperties = true
//! whitelist = ["message", "name", "stack"]
//! ```

pub mod serde_helpers;
mod validation;

use crate::domain::Level;
use crate::expose::ExposeConfig;
use crate::logging::{LogLevel, LoggingError, setup_logging};
use crate::sender::HttpTransportConfig;
use serde::{Deserialize, Serialize};
use serde_helpers::{load_env_millis, load_env_string, load_env_string_opt, load_env_var};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const ENV_PREFIX: &str = "RASK_LOG_CLIENT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Service name stamped on every event.
    pub service: String,
    /// Collector URL receiving batches.
    pub endpoint: String,
    /// Caller-supplied client identifier, sent as `clientId`.
    pub client_id: Option<String>,
    /// Levels that flush the buffer as soon as they are logged.
    pub auto_flush_levels: Vec<Level>,
    #[serde(with = "serde_helpers")]
    pub timeout: Duration,
    #[serde(with = "serde_helpers")]
    pub connection_timeout: Duration,
    pub compression: bool,
    pub channel_capacity: usize,
    /// Verbosity of the client's own diagnostics.
    pub log_level: LogLevel,
    /// Error interceptor settings.
    pub errors: ExposeConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let transport = HttpTransportConfig::default();
        Self {
            service: "default".to_string(),
            endpoint: transport.endpoint,
            client_id: None,
            auto_flush_levels: vec![Level::Error],
            timeout: transport.timeout,
            connection_timeout: transport.connection_timeout,
            compression: transport.compression,
            channel_capacity: transport.channel_capacity,
            log_level: LogLevel::Info,
            errors: ExposeConfig::default(),
        }
    }
}

impl LoggerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, apply environment overrides, validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        load_env_string(&format!("{ENV_PREFIX}_SERVICE"), &mut self.service);
        load_env_string(&format!("{ENV_PREFIX}_ENDPOINT"), &mut self.endpoint);
        load_env_string_opt(&format!("{ENV_PREFIX}_CLIENT_ID"), &mut self.client_id);
        load_env_millis(&format!("{ENV_PREFIX}_TIMEOUT_MS"), &mut self.timeout)?;
        load_env_millis(
            &format!("{ENV_PREFIX}_CONNECTION_TIMEOUT_MS"),
            &mut self.connection_timeout,
        )?;
        load_env_var(
            &format!("{ENV_PREFIX}_CHANNEL_CAPACITY"),
            &mut self.channel_capacity,
        )?;
        load_env_var(&format!("{ENV_PREFIX}_COMPRESSION"), &mut self.compression)?;
        load_env_var(&format!("{ENV_PREFIX}_LOG_LEVEL"), &mut self.log_level)?;
        load_env_var(
            &format!("{ENV_PREFIX}_EXPOSE_OWN_PROPERTIES"),
            &mut self.errors.expose_own_properties,
        )?;

        if let Ok(levels) = std::env::var(format!("{ENV_PREFIX}_AUTO_FLUSH_LEVELS")) {
            self.auto_flush_levels = levels
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|e| {
                    ConfigError::EnvError(format!("Invalid {ENV_PREFIX}_AUTO_FLUSH_LEVELS: {e}"))
                })?;
        }

        Ok(())
    }

    /// Install the process-wide subscriber at `log_level`.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        setup_logging(self.log_level)
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
            connection_timeout: self.connection_timeout,
            compression: self.compression,
            channel_capacity: self.channel_capacity,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LoggerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auto_flush_levels, vec![Level::Error]);
        assert!(config.errors.expose_own_properties);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LoggerConfig::from_toml_str(
            r#"
            service = "checkout"
            timeout = 2500

            [errors]
            whitelist = ["name"]
            "#,
        )
        .unwrap();

        assert_eq!(config.service, "checkout");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.errors.whitelist, vec!["name"]);
        assert!(config.errors.expose_own_properties);
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn test_transport_config_mirrors_settings() {
        let config = LoggerConfig {
            endpoint: "https://collector.test/v1/events".to_string(),
            compression: true,
            ..Default::default()
        };

        let transport = config.transport_config();
        assert_eq!(transport.endpoint, "https://collector.test/v1/events");
        assert!(transport.compression);
    }
}
