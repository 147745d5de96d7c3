//! HTTP error mapping

use polish_core::PolishError;
use serde::Serialize;
use std::convert::Infallible;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

/// Errors surfaced by the HTTP layer
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// No live session with this id
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// Copy requested with nothing to copy
    #[error("no corrected text to copy")]
    NoResult,

    /// Refusal from the session controller
    #[error(transparent)]
    Session(#[from] PolishError),
}

impl WebError {
    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) | Self::NoResult => StatusCode::NOT_FOUND,
            Self::Session(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Session(err) if err.is_conflict() => StatusCode::CONFLICT,
            Self::Session(PolishError::IllegalTransition { .. }) => StatusCode::CONFLICT,
            Self::Session(_) => StatusCode::GONE,
        }
    }

    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::NoResult => "no_result",
            Self::Session(PolishError::Validation) => "validation",
            Self::Session(PolishError::UnknownMode(_)) => "unknown_mode",
            Self::Session(PolishError::Busy) => "busy",
            Self::Session(PolishError::GateOpen) => "gate_open",
            Self::Session(PolishError::Locked) => "locked",
            Self::Session(PolishError::IllegalTransition { .. }) => "illegal_transition",
            Self::Session(PolishError::SessionClosed) => "session_closed",
        }
    }

    /// Message shown to the user
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Session(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Check if the target does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }
}

impl warp::reject::Reject for WebError {}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// Turn any rejection into a JSON error response
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found", "not found".to_string())
    } else if let Some(web) = err.find::<WebError>() {
        (web.status(), web.code(), web.message())
    } else if let Some(body) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "bad_request", body.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            "request body too large".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            "expected application/json".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "method not allowed".to_string(),
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "internal error".to_string(),
        )
    };

    let body = ErrorBody {
        error: message,
        code,
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
