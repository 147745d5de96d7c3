//! Session configuration
//!
//! Plain serde structs with defaults, so a partial TOML table only overrides
//! the keys it names.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Unlock gate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Ticks from open to unlock
    pub countdown_ticks: u32,
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
}

impl GateConfig {
    /// Tick period as a duration
    #[inline]
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// With countdown length
    #[inline]
    #[must_use]
    pub fn with_countdown_ticks(mut self, ticks: u32) -> Self {
        self.countdown_ticks = ticks;
        self
    }

    /// With tick period
    #[inline]
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 5,
            tick_interval_ms: 1000,
        }
    }
}

/// Session driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Upper bound on one collaborator call, in seconds
    pub request_timeout_secs: u64,
    /// Capacity of the command channel per session
    pub command_buffer: usize,
}

impl DriverConfig {
    /// Request timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            command_buffer: 64,
        }
    }
}

/// Everything a session needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub gate: GateConfig,
    pub driver: DriverConfig,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With gate settings
    #[inline]
    #[must_use]
    pub fn with_gate(mut self, gate: GateConfig) -> Self {
        self.gate = gate;
        self
    }

    /// With driver settings
    #[inline]
    #[must_use]
    pub fn with_driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Parse from TOML text and validate
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` on out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file and validate
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - see [`SessionConfig::from_toml_str`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the first offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gate.countdown_ticks == 0 {
            return Err(ConfigError::Invalid {
                key: "gate.countdown_ticks",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.gate.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "gate.tick_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.driver.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "driver.request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.driver.command_buffer == 0 {
            return Err(ConfigError::Invalid {
                key: "driver.command_buffer",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_product_behavior() {
        let config = SessionConfig::default();
        assert_eq!(config.gate.countdown_ticks, 5);
        assert_eq!(config.gate.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.driver.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str("[gate]\ncountdown_ticks = 3\n").unwrap();
        assert_eq!(
            config,
            SessionConfig::new().with_gate(GateConfig::default().with_countdown_ticks(3))
        );
    }

    #[test]
    fn zero_countdown_is_rejected() {
        let err = SessionConfig::from_toml_str("[gate]\ncountdown_ticks = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "gate.countdown_ticks",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = SessionConfig::from_toml_str("[gate\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[driver]\nrequest_timeout_secs = 10").unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.driver.request_timeout_secs, 10);
        assert_eq!(config.driver.command_buffer, 64);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = SessionConfig::from_file("/nonexistent/polish.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
