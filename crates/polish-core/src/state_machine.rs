//! Orchestrator phase table

use crate::error::PolishError;
use serde::{Deserialize, Serialize};

/// Coarse lifecycle phase of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Validates a phase transition.
///
/// Self-transitions are allowed for `Idle` only (repeated edits).
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), PolishError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(PolishError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::*;
    match from {
        Idle => vec![Idle, Loading],
        Loading => vec![Ready, Failed, Idle],
        Ready => vec![Idle, Loading],
        Failed => vec![Idle, Loading],
    }
}

fn allowed(from: Phase, to: Phase) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
