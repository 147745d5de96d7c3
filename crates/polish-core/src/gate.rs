//! Feature-unlock gate
//!
//! A timed state machine that simulates watching an advertisement before
//! advanced corrections are allowed. Completing the countdown unlocks the
//! session for good and releases the request that opened the gate; cancelling
//! discards it.
//!
//! The gate never touches a timer itself. The driver delivers [`GateEvent::Tick`]
//! at the configured cadence while [`Gate::is_open`] holds, and stops the timer
//! when a step reports that the gate closed.

use crate::config::GateConfig;
use crate::error::PolishError;
use crate::types::CorrectionRequest;
use serde::Serialize;

/// Session-wide unlock state, shared by the orchestrator and the gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionGateState {
    /// Advanced mode allowed; never reverts within a session
    pub unlocked: bool,
    /// Request that opened the gate, released once on completion
    pub pending: Option<CorrectionRequest>,
}

/// Countdown owned by an open gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownState {
    pub remaining_ticks: u32,
    pub running: bool,
}

/// Visible gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Counting(CountdownState),
}

/// Events consumed by the gate
#[derive(Debug, Clone)]
pub enum GateEvent {
    /// An advanced correction was triggered
    RequestAdvanced(CorrectionRequest),
    /// One countdown period elapsed
    Tick,
    /// User dismissed the overlay
    Cancel,
}

/// Why the gate closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    Completed,
    Cancelled,
}

/// Result of one gate event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateStep {
    /// Already unlocked; hand the request straight to the orchestrator
    Forward(CorrectionRequest),
    /// Countdown started
    Opened { remaining: u32 },
    /// Countdown advanced
    Ticked { remaining: u32 },
    /// Countdown reached zero; the session is unlocked
    Completed { pending: Option<CorrectionRequest> },
    /// Overlay dismissed; pending request dropped
    Cancelled,
    /// Event had no effect in the current state
    Ignored,
}

impl GateStep {
    /// Whether this step closed the gate
    #[inline]
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        match self {
            Self::Completed { .. } => Some(CloseReason::Completed),
            Self::Cancelled => Some(CloseReason::Cancelled),
            _ => None,
        }
    }
}

/// Side-effect hook invoked when the gate opens and closes
///
/// Stands in for an ad or analytics SDK. Implementations must not block.
pub trait GateObserver: Send + Sync + std::fmt::Debug {
    /// Gate overlay shown
    fn on_open(&self);

    /// Gate overlay hidden
    fn on_close(&self, reason: CloseReason);
}

/// Observer that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl GateObserver for LogObserver {
    fn on_open(&self) {
        tracing::info!("Unlock gate opened");
    }

    fn on_close(&self, reason: CloseReason) {
        tracing::info!("Unlock gate closed: {:?}", reason);
    }
}

/// The unlock gate
#[derive(Debug, Clone)]
pub struct Gate {
    state: GateState,
    initial_ticks: u32,
    generation: u64,
}

impl Gate {
    /// Create a closed gate
    #[inline]
    #[must_use]
    pub fn new(config: &GateConfig) -> Self {
        Self {
            state: GateState::Closed,
            initial_ticks: config.countdown_ticks.max(1),
            generation: 0,
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Whether the countdown is running
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, GateState::Counting(_))
    }

    /// Ticks left, zero when closed
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> u32 {
        match self.state {
            GateState::Counting(c) => c.remaining_ticks,
            GateState::Closed => 0,
        }
    }

    /// Fraction of the countdown still to run, for the progress bar
    #[must_use]
    pub fn progress(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.remaining() as f32 / self.initial_ticks as f32;
        fraction
    }

    /// Counter bumped every time the gate opens
    ///
    /// Ticks are tagged with it so a tick scheduled for an earlier opening
    /// can be recognized and dropped.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one event
    ///
    /// # Errors
    /// - `PolishError::GateOpen` if an advanced request arrives mid-countdown
    pub fn handle(
        &mut self,
        event: GateEvent,
        session: &mut SessionGateState,
    ) -> Result<GateStep, PolishError> {
        match event {
            GateEvent::RequestAdvanced(request) => {
                if session.unlocked || !request.mode().is_gated() {
                    return Ok(GateStep::Forward(request));
                }
                if self.is_open() {
                    return Err(PolishError::GateOpen);
                }
                session.pending = Some(request);
                self.generation += 1;
                self.state = GateState::Counting(CountdownState {
                    remaining_ticks: self.initial_ticks,
                    running: true,
                });
                Ok(GateStep::Opened {
                    remaining: self.initial_ticks,
                })
            }
            GateEvent::Tick => {
                let GateState::Counting(mut countdown) = self.state else {
                    return Ok(GateStep::Ignored);
                };
                countdown.remaining_ticks = countdown.remaining_ticks.saturating_sub(1);
                tracing::debug!("Gate countdown: {} left", countdown.remaining_ticks);

                if countdown.remaining_ticks > 0 {
                    self.state = GateState::Counting(countdown);
                    return Ok(GateStep::Ticked {
                        remaining: countdown.remaining_ticks,
                    });
                }

                self.state = GateState::Closed;
                session.unlocked = true;
                tracing::info!("Advanced mode unlocked for this session");
                Ok(GateStep::Completed {
                    pending: session.pending.take(),
                })
            }
            GateEvent::Cancel => {
                if !self.is_open() {
                    return Ok(GateStep::Ignored);
                }
                self.state = GateState::Closed;
                session.pending = None;
                Ok(GateStep::Cancelled)
            }
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}
