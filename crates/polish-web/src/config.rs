//! Server configuration
//!
//! Sources, lowest priority first:
//! 1. Defaults
//! 2. TOML file named by `POLISH_CONFIG`
//! 3. Environment variables (`POLISH_BIND`, `POLISH_LOG_FORMAT`,
//!    `GEMINI_API_KEY`/`API_KEY`, `POLISH_MODEL`)

use polish_core::{ConfigError, DriverConfig, GateConfig, SessionConfig};
use polish_gemini::GeminiConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                key: "web.log_format",
                reason: format!("expected `pretty` or `json`, got `{other}`"),
            }),
        }
    }
}

/// HTTP listener and session registry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Maximum live sessions
    pub session_capacity: u64,
    /// Idle time after which a session is dropped
    pub session_idle_secs: u64,
    /// Log output format
    pub log_format: LogFormat,
}

impl WebConfig {
    /// Session idle expiry
    #[inline]
    #[must_use]
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// With session capacity
    #[inline]
    #[must_use]
    pub fn with_session_capacity(mut self, capacity: u64) -> Self {
        self.session_capacity = capacity;
        self
    }

    /// With idle expiry
    #[inline]
    #[must_use]
    pub fn with_session_idle_secs(mut self, secs: u64) -> Self {
        self.session_idle_secs = secs;
        self
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            session_capacity: 10_000,
            session_idle_secs: 30 * 60,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub web: WebConfig,
    pub gate: GateConfig,
    pub driver: DriverConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Load from `POLISH_CONFIG` (if set) and the process environment
    ///
    /// # Errors
    /// - see [`AppConfig::load_with`]
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for environment variables
    ///
    /// # Errors
    /// - `ConfigError::Read` if the named file cannot be read
    /// - `ConfigError::Parse` on malformed TOML
    /// - `ConfigError::Invalid` on bad values
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = match lookup("POLISH_CONFIG") {
            Some(path) if !path.trim().is_empty() => Self::read_file(path)?,
            _ => Self::default(),
        };
        let config = base.with_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text without validating
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn with_env_overrides(
        mut self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = lookup("POLISH_BIND") {
            self.web.bind = bind.parse().map_err(|_| ConfigError::Invalid {
                key: "web.bind",
                reason: format!("not a socket address: {bind}"),
            })?;
        }
        if let Some(format) = lookup("POLISH_LOG_FORMAT") {
            self.web.log_format = format.parse()?;
        }
        self.gemini = self.gemini.with_env_overrides(lookup);
        Ok(self)
    }

    /// Session settings handed to each new session
    #[must_use]
    pub fn session(&self) -> SessionConfig {
        SessionConfig::new()
            .with_gate(self.gate.clone())
            .with_driver(self.driver.clone())
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the first offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.web.session_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "web.session_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.web.session_idle_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "web.session_idle_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        self.session().validate()?;
        self.gemini.validate()
    }
}
