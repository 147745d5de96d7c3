//! Testing utilities for LinguaPolish workspace
//!
//! Shared test helpers, fixtures, and a scripted collaborator.

#![allow(missing_docs)]

use parking_lot::Mutex;
use polish_core::{
    CloseReason, CorrectionError, CorrectionMode, CorrectionResult, Corrector, GateObserver,
    SessionConfig, SessionHandle,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

type Outcome = Result<CorrectionResult, CorrectionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub text: String,
    pub mode: CorrectionMode,
}

#[derive(Debug)]
enum Reply {
    Immediate(Outcome),
    Held(oneshot::Receiver<Outcome>),
}

/// Releases a held reply
#[derive(Debug)]
pub struct HeldReply(oneshot::Sender<Outcome>);

impl HeldReply {
    pub fn release(self, outcome: Outcome) {
        let _ = self.0.send(outcome);
    }
}

/// Collaborator that replays queued outcomes in call order
///
/// With nothing queued it echoes the input back as the corrected text.
#[derive(Debug, Default)]
pub struct ScriptedCorrector {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl ScriptedCorrector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, result: CorrectionResult) {
        self.replies.lock().push_back(Reply::Immediate(Ok(result)));
    }

    pub fn push_err(&self, error: CorrectionError) {
        self.replies.lock().push_back(Reply::Immediate(Err(error)));
    }

    /// Queue a reply that only resolves when the returned handle is released
    pub fn push_held(&self) -> HeldReply {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().push_back(Reply::Held(rx));
        HeldReply(tx)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait::async_trait]
impl Corrector for ScriptedCorrector {
    async fn perform_correction(&self, text: &str, mode: CorrectionMode) -> Outcome {
        self.calls.lock().push(RecordedCall {
            text: text.to_string(),
            mode,
        });
        let reply = self.replies.lock().pop_front();
        match reply {
            Some(Reply::Immediate(outcome)) => outcome,
            Some(Reply::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(CorrectionError::Transport("reply dropped".into()))),
            None => Ok(CorrectionResult::new(text)),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateNotice {
    Opened,
    Closed(CloseReason),
}

/// Gate observer that records every notification
#[derive(Debug, Default)]
pub struct RecordingObserver {
    notices: Mutex<Vec<GateNotice>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<GateNotice> {
        self.notices.lock().clone()
    }
}

impl GateObserver for RecordingObserver {
    fn on_open(&self) {
        self.notices.lock().push(GateNotice::Opened);
    }

    fn on_close(&self, reason: CloseReason) {
        self.notices.lock().push(GateNotice::Closed(reason));
    }
}

pub fn spawn_test_session(
    corrector: Arc<ScriptedCorrector>,
    observer: Arc<RecordingObserver>,
) -> SessionHandle {
    SessionHandle::spawn("test", corrector, observer, &SessionConfig::new())
}

pub fn basic_fixture() -> (&'static str, CorrectionResult) {
    (
        "i has went to the store",
        CorrectionResult::new("I have gone to the store."),
    )
}

pub fn advanced_fixture() -> (&'static str, CorrectionResult) {
    (
        "ok so like basically the thing is good",
        CorrectionResult::new("Overall, the product is good.")
            .with_explanation("Improved tone and removed filler words."),
    )
}
