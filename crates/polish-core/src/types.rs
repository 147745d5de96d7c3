//! Core types for LinguaPolish
//!
//! Defines the values that flow through a session:
//! - Correction modes and requests
//! - Correction results produced by the collaborator
//! - Dispatch sequence numbers used for last-request-wins

use crate::error::PolishError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Correction profile requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionMode {
    /// Grammar, spelling and punctuation only. Always free.
    Basic,
    /// Tone, vocabulary and clarity rewrite. Gated until unlocked.
    Advanced,
}

impl CorrectionMode {
    /// Wire name of the mode
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Advanced => "ADVANCED",
        }
    }

    /// Whether this mode sits behind the unlock gate
    #[inline]
    #[must_use]
    pub fn is_gated(self) -> bool {
        matches!(self, Self::Advanced)
    }
}

impl std::fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionMode {
    type Err = PolishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASIC" => Ok(Self::Basic),
            "ADVANCED" => Ok(Self::Advanced),
            other => Err(PolishError::UnknownMode(other.to_string())),
        }
    }
}

/// A validated correction request
///
/// Can only be built from non-blank text, so every request that reaches the
/// collaborator carries something to correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionRequest {
    text: String,
    mode: CorrectionMode,
}

impl CorrectionRequest {
    /// Create a new request
    ///
    /// # Errors
    /// - `PolishError::Validation` if `text` is empty or whitespace only
    pub fn new(text: impl Into<String>, mode: CorrectionMode) -> Result<Self, PolishError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PolishError::Validation);
        }
        Ok(Self { text, mode })
    }

    /// Raw text as entered (not trimmed)
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Requested mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> CorrectionMode {
        self.mode
    }
}

/// Structured output of a successful correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionResult {
    /// The fully corrected version of the input text
    pub corrected_text: String,
    /// Brief explanation of the changes, mainly for advanced mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Individual changes, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<String>>,
}

impl CorrectionResult {
    /// Create a result with corrected text only
    #[inline]
    #[must_use]
    pub fn new(corrected_text: impl Into<String>) -> Self {
        Self {
            corrected_text: corrected_text.into(),
            explanation: None,
            changes: None,
        }
    }

    /// With explanation
    #[inline]
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// With list of changes
    #[inline]
    #[must_use]
    pub fn with_changes(mut self, changes: Vec<String>) -> Self {
        self.changes = Some(changes);
        self
    }
}

/// Monotonic tag attached to every outbound dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DispatchSeq(pub u64);

impl DispatchSeq {
    /// Next sequence number
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for DispatchSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An outbound call the driver must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Sequence number to report back on settlement
    pub seq: DispatchSeq,
    /// Request to send
    pub request: CorrectionRequest,
}
