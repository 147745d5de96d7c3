//! Web surface wired to the Gemini client and a local stand-in provider

use polish_core::{LogObserver, Phase, MISSING_API_KEY};
use polish_gemini::{GeminiConfig, GeminiCorrector};
use polish_web::{routes, AppConfig, AppState};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use warp::Filter;

fn stand_in(payload: &'static str) -> SocketAddr {
    let route = warp::post()
        .and(warp::path!("v1beta" / "models" / String))
        .map(move |_model: String| {
            warp::reply::json(&json!({
                "candidates": [{ "content": { "parts": [{ "text": payload }] } }]
            }))
        });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn app(gemini: GeminiConfig) -> AppState {
    let corrector = GeminiCorrector::new(gemini).unwrap();
    AppState::new(Arc::new(corrector), Arc::new(LogObserver), &AppConfig::default())
}

async fn send(state: &AppState, method: &str, path: &str, body: Option<Value>) -> Value {
    let mut request = warp::test::request().method(method).path(path);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.reply(&routes(state.clone())).await;
    serde_json::from_slice(response.body()).unwrap()
}

async fn run_basic(state: &AppState, text: &str) -> polish_core::SessionSnapshot {
    let created = send(state, "POST", "/api/sessions", None).await;
    let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    send(state, "PUT", &format!("/api/sessions/{id}/text"), Some(json!({ "text": text }))).await;
    send(
        state,
        "POST",
        &format!("/api/sessions/{id}/correct"),
        Some(json!({ "mode": "BASIC" })),
    )
    .await;

    let handle = state.get(id).await.unwrap();
    tokio::time::timeout(
        Duration::from_secs(10),
        handle.wait_for(|s| s.phase != Phase::Loading),
    )
    .await
    .unwrap()
    .unwrap()
}

#[tokio::test]
async fn test_basic_correction_through_provider() {
    let addr = stand_in(r#"{"correctedText":"I have gone to the store."}"#);
    let state = app(
        GeminiConfig::new()
            .with_endpoint(format!("http://{addr}/v1beta"))
            .with_api_key("k"),
    );

    let done = run_basic(&state, "i has went to the store").await;
    assert_eq!(done.phase, Phase::Ready);
    let result = done.result.unwrap();
    assert_eq!(result.corrected_text, "I have gone to the store.");
    assert_eq!(result.explanation, None);
}

#[tokio::test]
async fn test_missing_key_shows_configuration_message() {
    let addr = stand_in(r#"{"correctedText":"unused"}"#);
    let state = app(GeminiConfig::new().with_endpoint(format!("http://{addr}/v1beta")));

    let done = run_basic(&state, "text").await;
    assert_eq!(done.phase, Phase::Failed);
    assert_eq!(done.error.as_deref(), Some(MISSING_API_KEY));
    assert!(done.can_submit);
}
