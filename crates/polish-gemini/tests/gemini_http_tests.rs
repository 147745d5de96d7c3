//! Gemini client against a local stand-in server
//!
//! The stand-in records what it receives and answers with a canned reply.

use polish_core::{CorrectionError, CorrectionMode, CorrectionResult, Corrector};
use polish_gemini::{GeminiConfig, GeminiCorrector};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::Filter;

#[derive(Debug, Clone)]
struct Received {
    model: String,
    key: String,
    body: Value,
}

type Log = Arc<Mutex<Vec<Received>>>;

/// Start a server that answers every call with `status` and `reply`
fn stand_in(status: StatusCode, reply: Value) -> (SocketAddr, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();

    let route = warp::post()
        .and(warp::path!("v1beta" / "models" / String))
        .and(warp::header::<String>("x-goog-api-key"))
        .and(warp::body::json())
        .map(move |model: String, key: String, body: Value| {
            sink.lock().unwrap().push(Received { model, key, body });
            warp::reply::with_status(warp::reply::json(&reply), status)
        });

    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, log)
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn corrector_for(addr: SocketAddr) -> GeminiCorrector {
    GeminiCorrector::new(
        GeminiConfig::new()
            .with_endpoint(format!("http://{addr}/v1beta"))
            .with_api_key("test-key"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_basic_request_shape_and_result() {
    let (addr, log) = stand_in(
        StatusCode::OK,
        candidate(r#"{"correctedText":"I have gone to the store."}"#),
    );
    let corrector = corrector_for(addr);

    let result = corrector
        .perform_correction("i has went to the store", CorrectionMode::Basic)
        .await
        .unwrap();
    assert_eq!(result, CorrectionResult::new("I have gone to the store."));

    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let call = &received[0];
    assert_eq!(call.model, "gemini-2.5-flash-lite:generateContent");
    assert_eq!(call.key, "test-key");
    assert_eq!(
        call.body["contents"][0]["parts"][0]["text"],
        json!("i has went to the store")
    );
    assert!(call.body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("strict grammar corrector"));
    assert_eq!(
        call.body["generationConfig"]["responseMimeType"],
        json!("application/json")
    );
    assert_eq!(
        call.body["generationConfig"]["responseSchema"]["required"],
        json!(["correctedText"])
    );
}

#[tokio::test]
async fn test_advanced_result_keeps_explanation() {
    let (addr, log) = stand_in(
        StatusCode::OK,
        candidate(
            r#"{"correctedText":"I think this is a good idea.","explanation":"Removed filler words."}"#,
        ),
    );
    let corrector = corrector_for(addr);

    let result = corrector
        .perform_correction("ok so like i think", CorrectionMode::Advanced)
        .await
        .unwrap();
    assert_eq!(result.explanation.as_deref(), Some("Removed filler words."));

    let received = log.lock().unwrap().clone();
    assert!(received[0].body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("expert editor"));
}

#[tokio::test]
async fn test_error_status_is_transport_failure() {
    let (addr, _log) = stand_in(
        StatusCode::FORBIDDEN,
        json!({ "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" } }),
    );
    let err = corrector_for(addr)
        .perform_correction("text", CorrectionMode::Basic)
        .await
        .unwrap_err();

    match err {
        CorrectionError::Transport(detail) => {
            assert!(detail.contains("403"));
            assert!(detail.contains("API key not valid"));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_corrected_text_is_schema_failure() {
    let (addr, _log) = stand_in(StatusCode::OK, candidate(r#"{"explanation":"nothing"}"#));
    let err = corrector_for(addr)
        .perform_correction("text", CorrectionMode::Basic)
        .await
        .unwrap_err();
    assert!(matches!(err, CorrectionError::Schema(_)));
}

#[tokio::test]
async fn test_prose_reply_is_schema_failure() {
    let (addr, _log) = stand_in(StatusCode::OK, candidate("Here is your corrected text!"));
    let err = corrector_for(addr)
        .perform_correction("text", CorrectionMode::Basic)
        .await
        .unwrap_err();
    assert!(matches!(err, CorrectionError::Schema(_)));
}

#[tokio::test]
async fn test_no_candidates_is_schema_failure() {
    let (addr, _log) = stand_in(StatusCode::OK, json!({ "candidates": [] }));
    let err = corrector_for(addr)
        .perform_correction("text", CorrectionMode::Basic)
        .await
        .unwrap_err();
    assert!(matches!(err, CorrectionError::Schema(ref m) if m.contains("empty")));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    // Bind then drop to get a port with nothing listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let corrector = GeminiCorrector::new(
        GeminiConfig::new()
            .with_endpoint(format!("http://127.0.0.1:{port}/v1beta"))
            .with_api_key("k"),
    )
    .unwrap();

    let err = corrector
        .perform_correction("text", CorrectionMode::Basic)
        .await
        .unwrap_err();
    assert!(matches!(err, CorrectionError::Transport(_)));
}
