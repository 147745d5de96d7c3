//! Session driver
//!
//! Runs one [`Session`] inside a tokio task and performs its effects:
//! - Correction calls run in spawned tasks and report back as settlements
//! - The countdown is a repeating timer task, aborted when the gate closes
//! - Every processed event publishes a fresh [`SessionSnapshot`]
//!
//! Events are handled one at a time, so the session itself needs no locking.
//! Dropping every [`SessionHandle`] stops the driver.

use crate::config::SessionConfig;
use crate::corrector::Corrector;
use crate::error::{CorrectionError, PolishError};
use crate::gate::GateObserver;
use crate::session::{Effect, Session, SessionSnapshot};
use crate::types::{CorrectionMode, CorrectionResult, Dispatch, DispatchSeq};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

type Reply<T> = oneshot::Sender<Result<T, PolishError>>;

/// User commands accepted by the driver
#[derive(Debug)]
enum Command {
    Edit(String, Reply<()>),
    Clear(Reply<()>),
    Request(CorrectionMode, Reply<()>),
    CancelGate(Reply<()>),
    CopyResult(Reply<Option<String>>),
}

/// Events produced by the driver's own tasks
#[derive(Debug)]
enum Internal {
    Tick {
        generation: u64,
    },
    Settled {
        seq: DispatchSeq,
        outcome: Result<CorrectionResult, CorrectionError>,
    },
}

/// Cloneable handle to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Spawn a driver task for a new session
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        name: impl Into<String>,
        corrector: Arc<dyn Corrector>,
        observer: Arc<dyn GateObserver>,
        config: &SessionConfig,
    ) -> Self {
        let name = name.into();
        let session = Session::new(&config.gate);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (command_tx, command_rx) = mpsc::channel(config.driver.command_buffer.max(1));
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let driver = SessionDriver {
            session,
            corrector,
            observer,
            tick_interval: config.gate.tick_interval(),
            request_timeout: config.driver.request_timeout(),
            internal_tx,
            countdown: None,
            snapshots: snapshot_tx,
        };

        tracing::debug!("Spawning session driver {}", name);
        tokio::spawn(
            driver
                .run(command_rx, internal_rx)
                .instrument(tracing::info_span!("session", id = %name)),
        );

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }

    /// Replace the editor text
    ///
    /// # Errors
    /// - `PolishError::SessionClosed` if the driver has stopped
    pub async fn edit_text(&self, text: impl Into<String>) -> Result<(), PolishError> {
        let text = text.into();
        self.call(|reply| Command::Edit(text, reply)).await
    }

    /// Empty the editor
    ///
    /// # Errors
    /// - `PolishError::SessionClosed` if the driver has stopped
    pub async fn clear(&self) -> Result<(), PolishError> {
        self.call(Command::Clear).await
    }

    /// Trigger a correction of the current text
    ///
    /// Returns once the request was dispatched or the gate opened; the
    /// outcome arrives through the snapshots.
    ///
    /// # Errors
    /// - any refusal from [`Session::request`]
    /// - `PolishError::SessionClosed` if the driver has stopped
    pub async fn request(&self, mode: CorrectionMode) -> Result<(), PolishError> {
        self.call(|reply| Command::Request(mode, reply)).await
    }

    /// Dismiss the unlock gate
    ///
    /// # Errors
    /// - `PolishError::SessionClosed` if the driver has stopped
    pub async fn cancel_gate(&self) -> Result<(), PolishError> {
        self.call(Command::CancelGate).await
    }

    /// Corrected text of the displayed result
    ///
    /// # Errors
    /// - `PolishError::SessionClosed` if the driver has stopped
    pub async fn copy_result(&self) -> Result<Option<String>, PolishError> {
        self.call(Command::CopyResult).await
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver for snapshot updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`
    ///
    /// # Errors
    /// - `PolishError::SessionClosed` if the driver stops first
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, PolishError> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| PolishError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, PolishError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| PolishError::SessionClosed)?;
        rx.await.map_err(|_| PolishError::SessionClosed)?
    }
}

struct SessionDriver {
    session: Session,
    corrector: Arc<dyn Corrector>,
    observer: Arc<dyn GateObserver>,
    tick_interval: Duration,
    request_timeout: Duration,
    internal_tx: mpsc::UnboundedSender<Internal>,
    countdown: Option<JoinHandle<()>>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionDriver {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(event) = internal.recv() => {
                    self.on_internal(event);
                    self.publish();
                }
            }
        }

        self.stop_countdown();
        tracing::debug!("Session driver stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Edit(text, reply) => {
                let result = self.session.edit_text(text);
                self.respond(reply, result);
            }
            Command::Clear(reply) => {
                let result = self.session.clear();
                self.respond(reply, result);
            }
            Command::Request(mode, reply) => {
                let result = self
                    .session
                    .request(mode)
                    .map(|effects| self.apply(effects));
                if let Err(err) = &result {
                    tracing::debug!("{} request refused: {}", mode, err);
                }
                self.respond(reply, result);
            }
            Command::CancelGate(reply) => {
                let result = self
                    .session
                    .cancel_gate()
                    .map(|effects| self.apply(effects));
                self.respond(reply, result);
            }
            Command::CopyResult(reply) => {
                let text = self.session.copy_result().map(str::to_string);
                let _ = reply.send(Ok(text));
            }
        }
    }

    /// Publish before replying so the caller observes its own change
    fn respond<T>(&self, reply: Reply<T>, result: Result<T, PolishError>) {
        self.publish();
        let _ = reply.send(result);
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }

    fn on_internal(&mut self, event: Internal) {
        match event {
            Internal::Tick { generation } => match self.session.tick(generation) {
                Ok(effects) => self.apply(effects),
                Err(err) => tracing::warn!("Tick rejected: {}", err),
            },
            Internal::Settled { seq, outcome } => {
                if let Err(err) = self.session.settle(seq, outcome) {
                    tracing::warn!("Settlement {} rejected: {}", seq, err);
                }
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Dispatch(dispatch) => self.spawn_dispatch(dispatch),
                Effect::StartCountdown { generation } => self.start_countdown(generation),
                Effect::StopCountdown => self.stop_countdown(),
                Effect::GateOpened => self.observer.on_open(),
                Effect::GateClosed(reason) => self.observer.on_close(reason),
            }
        }
    }

    fn spawn_dispatch(&self, dispatch: Dispatch) {
        let corrector = Arc::clone(&self.corrector);
        let tx = self.internal_tx.clone();
        let timeout = self.request_timeout;
        let Dispatch { seq, request } = dispatch;

        tokio::spawn(
            async move {
                tracing::debug!("Calling {} for {}", corrector.name(), seq);
                let outcome = match tokio::time::timeout(
                    timeout,
                    corrector.perform_correction(request.text(), request.mode()),
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(CorrectionError::Transport(format!(
                        "request timed out after {}s",
                        timeout.as_secs()
                    ))),
                };
                if let Err(err) = &outcome {
                    tracing::error!("{} failed for {}: {}", corrector.name(), seq, err);
                }
                // Driver gone means nobody is waiting for this result
                let _ = tx.send(Internal::Settled { seq, outcome });
            }
            .in_current_span(),
        );
    }

    fn start_countdown(&mut self, generation: u64) {
        self.stop_countdown();
        let tx = self.internal_tx.clone();
        let period = self.tick_interval;

        self.countdown = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                if tx.send(Internal::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}
