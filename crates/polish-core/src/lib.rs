//! LinguaPolish Core - correction lifecycle and feature-unlock gate
//!
//! The core coordinates:
//! - Editor text and the loading/result/error state of one page session
//! - Exactly one outbound correction call at a time, last request wins
//! - A timed unlock gate in front of the advanced mode
//!
//! # Example
//!
//! ```rust,ignore
//! use polish_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(corrector: Arc<dyn Corrector>) -> Result<(), PolishError> {
//! let session = SessionHandle::spawn(
//!     "demo",
//!     corrector,
//!     Arc::new(LogObserver),
//!     &SessionConfig::new(),
//! );
//!
//! session.edit_text("i has went to the store").await?;
//! session.request(CorrectionMode::Basic).await?;
//!
//! let done = session.wait_for(|s| s.phase != Phase::Loading).await?;
//! println!("{:?}", done.result);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod corrector;
pub mod driver;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod session;
pub mod state_machine;
pub mod types;

// Re-exports for convenience
pub use config::{DriverConfig, GateConfig, SessionConfig};
pub use corrector::Corrector;
pub use driver::SessionHandle;
pub use error::{
    ConfigError, CorrectionError, PolishError, GENERIC_FAILURE, MISSING_API_KEY,
    PROCESSING_FAILED, VALIDATION_PROMPT,
};
pub use gate::{
    CloseReason, CountdownState, Gate, GateEvent, GateObserver, GateState, GateStep,
    LogObserver, SessionGateState,
};
pub use orchestrator::{Orchestrator, OrchestratorEvent, OrchestratorState, Step};
pub use session::{Effect, GateSnapshot, Session, SessionSnapshot};
pub use state_machine::Phase;
pub use types::{CorrectionMode, CorrectionRequest, CorrectionResult, Dispatch, DispatchSeq};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with LinguaPolish Core
    pub use crate::{
        CorrectionError, CorrectionMode, CorrectionResult, Corrector, LogObserver, Phase,
        PolishError, SessionConfig, SessionHandle, SessionSnapshot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
