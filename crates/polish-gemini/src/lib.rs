//! LinguaPolish Gemini backend
//!
//! Implements [`polish_core::Corrector`] against the Gemini `generateContent`
//! REST API with structured JSON output. Each mode maps to its own system
//! instruction; responses are validated against the schema derived from
//! [`polish_core::CorrectionResult`] before they reach the session.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod profile;
pub mod schema;
pub mod wire;

pub use client::GeminiCorrector;
pub use config::{GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use schema::ResponseValidator;
