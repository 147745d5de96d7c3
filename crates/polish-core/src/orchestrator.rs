//! Correction orchestrator
//!
//! Owns the loading/result/error state of one editor and decides when an
//! outbound correction call is issued:
//! - Blank input is rejected locally with an inline prompt
//! - At most one call is in flight for the current state
//! - Every dispatch carries a sequence number; only the latest one may settle
//!
//! The orchestrator performs no I/O. It returns [`Step`]s that the caller
//! (the session driver) acts on.

use crate::error::{CorrectionError, PolishError, VALIDATION_PROMPT};
use crate::gate::SessionGateState;
use crate::state_machine::{validate_transition, Phase};
use crate::types::{CorrectionMode, CorrectionRequest, CorrectionResult, Dispatch, DispatchSeq};

/// Orchestrator state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Nothing displayed
    Idle,
    /// Waiting on the collaborator
    Loading {
        /// Sequence of the call being awaited
        seq: DispatchSeq,
        /// Mode of the call being awaited
        mode: CorrectionMode,
    },
    /// Latest call succeeded
    Ready(CorrectionResult),
    /// Latest call failed, with the message to display
    Failed(String),
}

impl OrchestratorState {
    /// Coarse phase for transition validation and rendering
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Loading { .. } => Phase::Loading,
            Self::Ready(_) => Phase::Ready,
            Self::Failed(_) => Phase::Failed,
        }
    }
}

/// Events consumed by the orchestrator
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    /// Input text changed
    Edited,
    /// Editor reset
    Cleared,
    /// Start a correction
    Submit(CorrectionRequest),
    /// An outbound call finished
    Settled {
        seq: DispatchSeq,
        outcome: Result<CorrectionResult, CorrectionError>,
    },
}

/// What the caller must do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Perform this call and report back with its sequence number
    Dispatch(Dispatch),
    /// A settlement was applied to the state
    Settled(Phase),
    /// A stale settlement was dropped
    Discarded(DispatchSeq),
    /// Nothing to do
    Noop,
}

/// The correction orchestrator
#[derive(Debug, Clone)]
pub struct Orchestrator {
    state: OrchestratorState,
    last_issued: DispatchSeq,
    prompt: Option<&'static str>,
}

impl Orchestrator {
    /// Create an idle orchestrator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: OrchestratorState::Idle,
            last_issued: DispatchSeq(0),
            prompt: None,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    /// Inline validation prompt, if the last trigger had blank input
    #[inline]
    #[must_use]
    pub fn prompt(&self) -> Option<&'static str> {
        self.prompt
    }

    /// Sequence number of the most recent dispatch
    #[inline]
    #[must_use]
    pub fn last_issued(&self) -> DispatchSeq {
        self.last_issued
    }

    /// Whether a call is being awaited
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, OrchestratorState::Loading { .. })
    }

    /// Build a request from editor text, recording the inline prompt on failure
    ///
    /// # Errors
    /// - `PolishError::Validation` if `text` is blank
    pub fn validate(
        &mut self,
        text: &str,
        mode: CorrectionMode,
    ) -> Result<CorrectionRequest, PolishError> {
        match CorrectionRequest::new(text, mode) {
            Ok(request) => Ok(request),
            Err(err) => {
                self.prompt = Some(VALIDATION_PROMPT);
                Err(err)
            }
        }
    }

    /// Apply one event
    ///
    /// # Errors
    /// - `PolishError::Busy` when submitting while loading
    /// - `PolishError::Locked` when submitting advanced mode before unlock
    /// - `PolishError::IllegalTransition` if the phase table rejects the move
    pub fn handle(
        &mut self,
        event: OrchestratorEvent,
        gate: &SessionGateState,
    ) -> Result<Step, PolishError> {
        match event {
            OrchestratorEvent::Edited | OrchestratorEvent::Cleared => {
                self.prompt = None;
                if let OrchestratorState::Loading { seq, .. } = self.state {
                    tracing::debug!("Abandoning in-flight correction {}", seq);
                }
                self.transition(OrchestratorState::Idle)?;
                Ok(Step::Noop)
            }
            OrchestratorEvent::Submit(request) => self.submit(request, gate),
            OrchestratorEvent::Settled { seq, outcome } => self.settle(seq, outcome),
        }
    }

    fn submit(
        &mut self,
        request: CorrectionRequest,
        gate: &SessionGateState,
    ) -> Result<Step, PolishError> {
        if self.is_loading() {
            return Err(PolishError::Busy);
        }
        if request.mode().is_gated() && !gate.unlocked {
            return Err(PolishError::Locked);
        }

        let seq = self.last_issued.next();
        self.transition(OrchestratorState::Loading {
            seq,
            mode: request.mode(),
        })?;
        self.last_issued = seq;
        self.prompt = None;

        tracing::info!("Dispatching {} correction {}", request.mode(), seq);
        Ok(Step::Dispatch(Dispatch { seq, request }))
    }

    fn settle(
        &mut self,
        seq: DispatchSeq,
        outcome: Result<CorrectionResult, CorrectionError>,
    ) -> Result<Step, PolishError> {
        let awaited = matches!(
            self.state,
            OrchestratorState::Loading { seq: current, .. } if current == seq
        );
        if !awaited || seq != self.last_issued {
            tracing::debug!(
                "Discarding stale settlement {} (latest {})",
                seq,
                self.last_issued
            );
            return Ok(Step::Discarded(seq));
        }

        let next = match outcome {
            Ok(result) => {
                tracing::info!("Correction {} ready", seq);
                OrchestratorState::Ready(result)
            }
            Err(err) => {
                tracing::warn!("Correction {} failed: {}", seq, err);
                OrchestratorState::Failed(err.user_message().to_string())
            }
        };
        let phase = next.phase();
        self.transition(next)?;
        Ok(Step::Settled(phase))
    }

    fn transition(&mut self, next: OrchestratorState) -> Result<(), PolishError> {
        validate_transition(self.state.phase(), next.phase())?;
        self.state = next;
        Ok(())
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GENERIC_FAILURE, PROCESSING_FAILED};

    fn unlocked() -> SessionGateState {
        SessionGateState {
            unlocked: true,
            pending: None,
        }
    }

    fn basic(text: &str) -> CorrectionRequest {
        CorrectionRequest::new(text, CorrectionMode::Basic).unwrap()
    }

    fn dispatch(orch: &mut Orchestrator, text: &str) -> Dispatch {
        match orch
            .handle(OrchestratorEvent::Submit(basic(text)), &unlocked())
            .unwrap()
        {
            Step::Dispatch(d) => d,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    #[test]
    fn submit_moves_to_loading_with_first_seq() {
        let mut orch = Orchestrator::new();
        let d = dispatch(&mut orch, "i has went");

        assert_eq!(d.seq, DispatchSeq(1));
        assert_eq!(d.request.mode(), CorrectionMode::Basic);
        assert!(orch.is_loading());
    }

    #[test]
    fn submit_while_loading_is_busy() {
        let mut orch = Orchestrator::new();
        dispatch(&mut orch, "first");

        let err = orch
            .handle(OrchestratorEvent::Submit(basic("second")), &unlocked())
            .unwrap_err();
        assert_eq!(err, PolishError::Busy);
        assert_eq!(orch.last_issued(), DispatchSeq(1));
    }

    #[test]
    fn advanced_requires_unlock() {
        let mut orch = Orchestrator::new();
        let req = CorrectionRequest::new("text", CorrectionMode::Advanced).unwrap();

        let err = orch
            .handle(OrchestratorEvent::Submit(req), &SessionGateState::default())
            .unwrap_err();
        assert_eq!(err, PolishError::Locked);
        assert_eq!(orch.state(), &OrchestratorState::Idle);
    }

    #[test]
    fn success_settles_ready() {
        let mut orch = Orchestrator::new();
        let d = dispatch(&mut orch, "i has went to the store");

        let step = orch
            .handle(
                OrchestratorEvent::Settled {
                    seq: d.seq,
                    outcome: Ok(CorrectionResult::new("I have gone to the store.")),
                },
                &unlocked(),
            )
            .unwrap();

        assert_eq!(step, Step::Settled(Phase::Ready));
        assert_eq!(
            orch.state(),
            &OrchestratorState::Ready(CorrectionResult::new("I have gone to the store."))
        );
    }

    #[test]
    fn failure_settles_with_user_message() {
        let mut orch = Orchestrator::new();
        let d = dispatch(&mut orch, "text");

        orch.handle(
            OrchestratorEvent::Settled {
                seq: d.seq,
                outcome: Err(CorrectionError::Transport("reset".into())),
            },
            &unlocked(),
        )
        .unwrap();

        assert_eq!(
            orch.state(),
            &OrchestratorState::Failed(PROCESSING_FAILED.to_string())
        );
    }

    #[test]
    fn empty_provider_message_falls_back() {
        let mut orch = Orchestrator::new();
        let d = dispatch(&mut orch, "text");

        orch.handle(
            OrchestratorEvent::Settled {
                seq: d.seq,
                outcome: Err(CorrectionError::Provider(String::new())),
            },
            &unlocked(),
        )
        .unwrap();

        assert_eq!(
            orch.state(),
            &OrchestratorState::Failed(GENERIC_FAILURE.to_string())
        );
    }

    #[test]
    fn edit_during_loading_discards_late_settlement() {
        let mut orch = Orchestrator::new();
        let d = dispatch(&mut orch, "text");

        orch.handle(OrchestratorEvent::Edited, &unlocked()).unwrap();
        assert_eq!(orch.state(), &OrchestratorState::Idle);

        let step = orch
            .handle(
                OrchestratorEvent::Settled {
                    seq: d.seq,
                    outcome: Ok(CorrectionResult::new("late")),
                },
                &unlocked(),
            )
            .unwrap();
        assert_eq!(step, Step::Discarded(d.seq));
        assert_eq!(orch.state(), &OrchestratorState::Idle);
    }

    #[test]
    fn out_of_order_settlement_keeps_latest() {
        let mut orch = Orchestrator::new();
        let a = dispatch(&mut orch, "request a");
        orch.handle(OrchestratorEvent::Edited, &unlocked()).unwrap();
        let b = dispatch(&mut orch, "request b");
        assert_eq!((a.seq, b.seq), (DispatchSeq(1), DispatchSeq(2)));

        orch.handle(
            OrchestratorEvent::Settled {
                seq: b.seq,
                outcome: Ok(CorrectionResult::new("B")),
            },
            &unlocked(),
        )
        .unwrap();
        let late = orch
            .handle(
                OrchestratorEvent::Settled {
                    seq: a.seq,
                    outcome: Ok(CorrectionResult::new("A")),
                },
                &unlocked(),
            )
            .unwrap();

        assert_eq!(late, Step::Discarded(a.seq));
        assert_eq!(orch.state(), &OrchestratorState::Ready(CorrectionResult::new("B")));
    }

    #[test]
    fn blank_validation_sets_prompt_until_edit() {
        let mut orch = Orchestrator::new();
        assert_eq!(
            orch.validate("   ", CorrectionMode::Basic),
            Err(PolishError::Validation)
        );
        assert_eq!(orch.prompt(), Some(VALIDATION_PROMPT));

        orch.handle(OrchestratorEvent::Edited, &unlocked()).unwrap();
        assert_eq!(orch.prompt(), None);
    }

    #[test]
    fn resubmit_from_ready_clears_result() {
        let mut orch = Orchestrator::new();
        let d = dispatch(&mut orch, "text");
        orch.handle(
            OrchestratorEvent::Settled {
                seq: d.seq,
                outcome: Ok(CorrectionResult::new("Text.")),
            },
            &unlocked(),
        )
        .unwrap();

        let again = dispatch(&mut orch, "text");
        assert_eq!(again.seq, DispatchSeq(2));
        assert!(orch.is_loading());
    }
}
