//! LinguaPolish web surface
//!
//! Serves the editor page and a small JSON API over per-page sessions.
//! Each session runs its own driver task from `polish_core`; this crate only
//! translates HTTP requests into session commands and snapshots into JSON.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod page;
pub mod routes;
pub mod state;

pub use config::{AppConfig, LogFormat, WebConfig};
pub use error::WebError;
pub use routes::routes;
pub use state::AppState;
