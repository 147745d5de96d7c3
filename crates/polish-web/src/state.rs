//! Live session registry
//!
//! One session per page load, keyed by a random id. Entries expire after a
//! period of inactivity; dropping the last handle stops the session driver.

use crate::config::AppConfig;
use crate::error::WebError;
use moka::future::Cache;
use polish_core::{Corrector, GateObserver, SessionConfig, SessionHandle};
use std::sync::Arc;
use uuid::Uuid;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    sessions: Cache<Uuid, SessionHandle>,
    corrector: Arc<dyn Corrector>,
    observer: Arc<dyn GateObserver>,
    session_config: SessionConfig,
}

impl AppState {
    /// Build state from configuration
    #[must_use]
    pub fn new(
        corrector: Arc<dyn Corrector>,
        observer: Arc<dyn GateObserver>,
        config: &AppConfig,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(config.web.session_capacity)
            .time_to_idle(config.web.session_idle())
            .build();
        Self {
            sessions,
            corrector,
            observer,
            session_config: config.session(),
        }
    }

    /// Start a new session
    ///
    /// Must be called from within a tokio runtime.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = SessionHandle::spawn(
            id.to_string(),
            self.corrector.clone(),
            self.observer.clone(),
            &self.session_config,
        );
        self.sessions.insert(id, handle.clone()).await;
        tracing::info!(session = %id, backend = self.corrector.name(), "Session created");
        (id, handle)
    }

    /// Look up a live session
    ///
    /// # Errors
    /// - `WebError::SessionNotFound` if the id is unknown or expired
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, WebError> {
        self.sessions
            .get(&id)
            .await
            .ok_or(WebError::SessionNotFound(id))
    }

    /// Number of live sessions after pending evictions are applied
    pub async fn session_count(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions.entry_count())
            .field("backend", &self.corrector.name())
            .finish_non_exhaustive()
    }
}
