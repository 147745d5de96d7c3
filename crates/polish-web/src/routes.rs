//! HTTP routes
//!
//! | Method | Path                              | Action             |
//! |--------|-----------------------------------|--------------------|
//! | GET    | `/`                               | editor page        |
//! | POST   | `/api/sessions`                   | create session     |
//! | GET    | `/api/sessions/{id}`              | snapshot           |
//! | PUT    | `/api/sessions/{id}/text`         | replace text       |
//! | POST   | `/api/sessions/{id}/clear`        | clear editor       |
//! | POST   | `/api/sessions/{id}/correct`      | trigger correction |
//! | POST   | `/api/sessions/{id}/gate/cancel`  | dismiss unlock gate|
//! | GET    | `/api/sessions/{id}/result`       | text to copy       |

use crate::error::{handle_rejection, WebError};
use crate::page::INDEX_HTML;
use crate::state::AppState;
use polish_core::{CorrectionMode, SessionSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Largest accepted JSON body
const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, Serialize)]
struct Created {
    id: Uuid,
    snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
struct EditBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CorrectBody {
    mode: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CopyBody {
    corrected_text: String,
}

/// All routes with JSON error recovery and request tracing
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML));

    let create = warp::path!("api" / "sessions")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(create_session);

    let snapshot = warp::path!("api" / "sessions" / Uuid)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_snapshot);

    let edit = warp::path!("api" / "sessions" / Uuid / "text")
        .and(warp::put())
        .and(json_body::<EditBody>())
        .and(with_state(state.clone()))
        .and_then(edit_text);

    let clear = warp::path!("api" / "sessions" / Uuid / "clear")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(clear_text);

    let correct = warp::path!("api" / "sessions" / Uuid / "correct")
        .and(warp::post())
        .and(json_body::<CorrectBody>())
        .and(with_state(state.clone()))
        .and_then(request_correction);

    let cancel = warp::path!("api" / "sessions" / Uuid / "gate" / "cancel")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(cancel_gate);

    let result = warp::path!("api" / "sessions" / Uuid / "result")
        .and(warp::get())
        .and(with_state(state))
        .and_then(copy_result);

    index
        .or(create)
        .or(snapshot)
        .or(edit)
        .or(clear)
        .or(correct)
        .or(cancel)
        .or(result)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

async fn create_session(state: AppState) -> Result<impl Reply, Rejection> {
    let (id, handle) = state.create().await;
    let body = Created {
        id,
        snapshot: handle.snapshot(),
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&body),
        StatusCode::CREATED,
    ))
}

async fn get_snapshot(id: Uuid, state: AppState) -> Result<impl Reply, Rejection> {
    let handle = state.get(id).await?;
    Ok(warp::reply::json(&handle.snapshot()))
}

async fn edit_text(id: Uuid, body: EditBody, state: AppState) -> Result<impl Reply, Rejection> {
    let handle = state.get(id).await?;
    handle.edit_text(body.text).await.map_err(WebError::from)?;
    Ok(warp::reply::json(&handle.snapshot()))
}

async fn clear_text(id: Uuid, state: AppState) -> Result<impl Reply, Rejection> {
    let handle = state.get(id).await?;
    handle.clear().await.map_err(WebError::from)?;
    Ok(warp::reply::json(&handle.snapshot()))
}

async fn request_correction(
    id: Uuid,
    body: CorrectBody,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let handle = state.get(id).await?;
    let mode: CorrectionMode = body.mode.parse().map_err(WebError::from)?;

    if let Err(err) = handle.request(mode).await {
        tracing::debug!(session = %id, %mode, "Correction refused: {}", err);
        return Err(WebError::from(err).into());
    }
    Ok(warp::reply::with_status(
        warp::reply::json(&handle.snapshot()),
        StatusCode::ACCEPTED,
    ))
}

async fn cancel_gate(id: Uuid, state: AppState) -> Result<impl Reply, Rejection> {
    let handle = state.get(id).await?;
    handle.cancel_gate().await.map_err(WebError::from)?;
    Ok(warp::reply::json(&handle.snapshot()))
}

async fn copy_result(id: Uuid, state: AppState) -> Result<impl Reply, Rejection> {
    let handle = state.get(id).await?;
    let text = handle
        .copy_result()
        .await
        .map_err(WebError::from)?
        .ok_or(WebError::NoResult)?;
    Ok(warp::reply::json(&CopyBody {
        corrected_text: text,
    }))
}
