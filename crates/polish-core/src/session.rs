//! Session controller
//!
//! Single owner of one editor's state: the input text, the orchestrator, the
//! unlock gate and the session-wide [`SessionGateState`] lent to both. Every
//! user action, timer tick and call settlement goes through here and comes
//! back as a list of [`Effect`]s for the driver to carry out.

use crate::config::GateConfig;
use crate::error::{CorrectionError, PolishError};
use crate::gate::{CloseReason, Gate, GateEvent, GateStep, SessionGateState};
use crate::orchestrator::{Orchestrator, OrchestratorEvent, OrchestratorState, Step};
use crate::state_machine::Phase;
use crate::types::{CorrectionMode, CorrectionRequest, CorrectionResult, Dispatch, DispatchSeq};
use serde::{Deserialize, Serialize};

/// Side effects requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the collaborator
    Dispatch(Dispatch),
    /// Start the repeating countdown timer, tagging ticks with `generation`
    StartCountdown { generation: u64 },
    /// Cancel the countdown timer
    StopCountdown,
    /// Notify the gate observer that the overlay is shown
    GateOpened,
    /// Notify the gate observer that the overlay is hidden
    GateClosed(CloseReason),
}

/// Gate portion of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub open: bool,
    pub remaining: u32,
    pub progress: f32,
}

/// Immutable view handed to the display layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub text: String,
    pub phase: Phase,
    pub result: Option<CorrectionResult>,
    pub error: Option<String>,
    pub prompt: Option<String>,
    pub unlocked: bool,
    pub gate: GateSnapshot,
    pub can_submit: bool,
    pub last_seq: u64,
}

/// One page session
#[derive(Debug, Clone)]
pub struct Session {
    text: String,
    orchestrator: Orchestrator,
    gate: Gate,
    gate_state: SessionGateState,
}

impl Session {
    /// Create an empty, locked session
    #[must_use]
    pub fn new(config: &GateConfig) -> Self {
        Self {
            text: String::new(),
            orchestrator: Orchestrator::new(),
            gate: Gate::new(config),
            gate_state: SessionGateState::default(),
        }
    }

    /// Current editor text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Orchestrator state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &OrchestratorState {
        self.orchestrator.state()
    }

    /// Unlock state shared with the gate
    #[inline]
    #[must_use]
    pub fn gate_state(&self) -> &SessionGateState {
        &self.gate_state
    }

    /// The gate
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Whether advanced mode is unlocked
    #[inline]
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.gate_state.unlocked
    }

    /// Replace the editor text, clearing any displayed result or error
    ///
    /// # Errors
    /// - `PolishError::IllegalTransition` if the phase table rejects the reset
    pub fn edit_text(&mut self, text: impl Into<String>) -> Result<(), PolishError> {
        self.text = text.into();
        self.orchestrator
            .handle(OrchestratorEvent::Edited, &self.gate_state)?;
        Ok(())
    }

    /// Empty the editor and reset to idle
    ///
    /// # Errors
    /// - `PolishError::IllegalTransition` if the phase table rejects the reset
    pub fn clear(&mut self) -> Result<(), PolishError> {
        self.text.clear();
        self.orchestrator
            .handle(OrchestratorEvent::Cleared, &self.gate_state)?;
        Ok(())
    }

    /// Trigger a correction of the current text
    ///
    /// # Errors
    /// - `PolishError::GateOpen` while the countdown runs
    /// - `PolishError::Validation` if the text is blank
    /// - `PolishError::Busy` while a call is in flight
    pub fn request(&mut self, mode: CorrectionMode) -> Result<Vec<Effect>, PolishError> {
        if self.gate.is_open() {
            return Err(PolishError::GateOpen);
        }
        let request = self.orchestrator.validate(&self.text, mode)?;
        if self.orchestrator.is_loading() {
            return Err(PolishError::Busy);
        }

        if !mode.is_gated() {
            return self.dispatch(request);
        }

        match self
            .gate
            .handle(GateEvent::RequestAdvanced(request), &mut self.gate_state)?
        {
            GateStep::Forward(request) => self.dispatch(request),
            GateStep::Opened { remaining } => {
                tracing::info!("Advanced mode locked, starting {}-tick countdown", remaining);
                Ok(vec![
                    Effect::GateOpened,
                    Effect::StartCountdown {
                        generation: self.gate.generation(),
                    },
                ])
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Deliver one countdown tick
    ///
    /// Ticks from an earlier opening of the gate are ignored.
    ///
    /// # Errors
    /// - propagates gate errors
    pub fn tick(&mut self, generation: u64) -> Result<Vec<Effect>, PolishError> {
        if generation != self.gate.generation() {
            tracing::debug!(
                "Ignoring tick for gate generation {} (current {})",
                generation,
                self.gate.generation()
            );
            return Ok(Vec::new());
        }

        match self.gate.handle(GateEvent::Tick, &mut self.gate_state)? {
            GateStep::Completed { pending } => {
                let mut effects = vec![
                    Effect::StopCountdown,
                    Effect::GateClosed(CloseReason::Completed),
                ];
                if let Some(request) = pending {
                    match self.dispatch(request) {
                        Ok(more) => effects.extend(more),
                        Err(err) => tracing::warn!("Pending request dropped: {}", err),
                    }
                }
                Ok(effects)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Dismiss the gate before it completes
    ///
    /// # Errors
    /// - propagates gate errors
    pub fn cancel_gate(&mut self) -> Result<Vec<Effect>, PolishError> {
        match self.gate.handle(GateEvent::Cancel, &mut self.gate_state)? {
            GateStep::Cancelled => {
                tracing::info!("Unlock gate cancelled, pending request discarded");
                Ok(vec![
                    Effect::StopCountdown,
                    Effect::GateClosed(CloseReason::Cancelled),
                ])
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Report the outcome of a dispatched call
    ///
    /// # Errors
    /// - `PolishError::IllegalTransition` if the phase table rejects the result
    pub fn settle(
        &mut self,
        seq: DispatchSeq,
        outcome: Result<CorrectionResult, CorrectionError>,
    ) -> Result<Step, PolishError> {
        self.orchestrator
            .handle(OrchestratorEvent::Settled { seq, outcome }, &self.gate_state)
    }

    /// Corrected text to copy, when a result is displayed
    #[must_use]
    pub fn copy_result(&self) -> Option<&str> {
        match self.orchestrator.state() {
            OrchestratorState::Ready(result) => Some(result.corrected_text.as_str()),
            _ => None,
        }
    }

    /// Whether the action controls are enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty() && !self.orchestrator.is_loading() && !self.gate.is_open()
    }

    /// Render-ready snapshot
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.orchestrator.state();
        SessionSnapshot {
            text: self.text.clone(),
            phase: state.phase(),
            result: match state {
                OrchestratorState::Ready(result) => Some(result.clone()),
                _ => None,
            },
            error: match state {
                OrchestratorState::Failed(message) => Some(message.clone()),
                _ => None,
            },
            prompt: self.orchestrator.prompt().map(str::to_string),
            unlocked: self.gate_state.unlocked,
            gate: GateSnapshot {
                open: self.gate.is_open(),
                remaining: self.gate.remaining(),
                progress: self.gate.progress(),
            },
            can_submit: self.can_submit(),
            last_seq: self.orchestrator.last_issued().0,
        }
    }

    fn dispatch(&mut self, request: CorrectionRequest) -> Result<Vec<Effect>, PolishError> {
        match self
            .orchestrator
            .handle(OrchestratorEvent::Submit(request), &self.gate_state)?
        {
            Step::Dispatch(dispatch) => Ok(vec![Effect::Dispatch(dispatch)]),
            _ => Ok(Vec::new()),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}
