//! Error types for LinguaPolish
//!
//! Provides error handling for:
//! - Input validation and controller refusals
//! - Collaborator failures (configuration, transport, schema)
//! - Configuration loading

use crate::state_machine::Phase;

/// Inline prompt shown when the user triggers an action with blank text
pub const VALIDATION_PROMPT: &str = "Please enter some text to correct.";

/// Message shown for transport and schema failures
pub const PROCESSING_FAILED: &str = "Failed to process text. Please try again.";

/// Fallback when a collaborator failure carries no message
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Message shown when no credential is configured
pub const MISSING_API_KEY: &str = "API key is missing.";

/// Errors returned by the session controller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolishError {
    /// Input text is blank
    #[error("validation failed: input text is blank")]
    Validation,

    /// A correction is already in flight
    #[error("a correction is already in progress")]
    Busy,

    /// The unlock gate is counting down
    #[error("the unlock gate is open")]
    GateOpen,

    /// Advanced mode requested while locked
    #[error("advanced mode is locked for this session")]
    Locked,

    /// Mode name not recognized
    #[error("unknown correction mode: {0}")]
    UnknownMode(String),

    /// Transition rejected by the phase table
    #[error("illegal transition: {from:?} -> {to:?}")]
    IllegalTransition { from: Phase, to: Phase },

    /// Session driver is gone
    #[error("session closed")]
    SessionClosed,
}

impl PolishError {
    /// Check if error is a user input problem
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation | Self::UnknownMode(_))
    }

    /// Check if the action was refused because something else is running
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Busy | Self::GateOpen | Self::Locked)
    }

    /// Message suitable for display next to the editor
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => VALIDATION_PROMPT.to_string(),
            other => other.to_string(),
        }
    }
}

/// Failures reported by the external correction collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CorrectionError {
    /// Credential missing or provider misconfigured
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network failure, non-2xx status or timeout
    #[error("transport error: {0}")]
    Transport(String),

    /// Payload missing required fields or not parseable
    #[error("schema error: {0}")]
    Schema(String),

    /// Provider-supplied failure, shown verbatim
    #[error("provider error: {0}")]
    Provider(String),
}

impl CorrectionError {
    /// Message shown to the user in the `Failed` state
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Configuration(_) => MISSING_API_KEY,
            Self::Transport(_) | Self::Schema(_) => PROCESSING_FAILED,
            Self::Provider(message) if !message.trim().is_empty() => message,
            Self::Provider(_) => GENERIC_FAILURE,
        }
    }

    /// Check if this is a configuration failure
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
