use super::{ConfigError, LoggerConfig};
use url::Url;

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate endpoint URL
        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid endpoint URL '{}': {}", self.endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.service.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Service name must not be empty".to_string(),
            ));
        }

        // Validate timeouts
        if self.timeout.is_zero() || self.connection_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Channel capacity must be greater than 0".to_string(),
            ));
        }

        if self.errors.whitelist.iter().any(|key| key.is_empty()) {
            return Err(ConfigError::InvalidConfig(
                "Error whitelist entries must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
