//! HTTP integration tests for the RefChat REST API
//!
//! Every test runs against its own temporary sessions file. Requests go
//! through the full Axum router with `oneshot`, including the CORS layer.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use refchat_core::corpus::canned_answers;
use refchat_core::{FileSessionStore, RefchatConfig, RoundRobin};
use refchat_server::http::{build_router, HttpState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Router over a fresh seeded store in `dir`
async fn make_app(dir: &TempDir) -> Router {
    let mut config = RefchatConfig::default();
    config.store.path = dir
        .path()
        .join("sessions.json")
        .to_string_lossy()
        .into_owned();

    let store = FileSessionStore::open(&config.store.path).await;
    let state = Arc::new(HttpState {
        store: Arc::new(store),
        responder: Arc::new(RoundRobin::with_builtin_corpus()),
        config,
    });
    build_router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn new_chat(app: &Router) -> String {
    let (status, body) = send(app, get("/api/new-chat")).await;
    assert_eq!(status, StatusCode::OK);
    body["sessionId"].as_str().unwrap().to_string()
}

// ===========================================================================
// TEST 1: GET /api/sessions - seeded store lists two summaries
// ===========================================================================
#[tokio::test]
async fn test_list_sessions_returns_seed_summaries() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;

    let (status, body) = send(&app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().expect("array of summaries");
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "Quarterly revenue analysis");
    assert!(list[0]["sessionId"].is_string());
    assert!(list[0]["lastUpdated"].is_string());
    assert!(list[0].get("messages").is_none(), "summaries carry no messages");
}

// ===========================================================================
// TEST 2: GET /api/new-chat - new session appears last in the list
// ===========================================================================
#[tokio::test]
async fn test_new_chat_is_listed_last() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;

    let id = new_chat(&app).await;
    let (_, body) = send(&app, get("/api/sessions")).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[2]["sessionId"], id);
    assert_eq!(list[2]["title"], "New Chat");
}

// ===========================================================================
// TEST 3: GET /api/session/:id - full record and 404
// ===========================================================================
#[tokio::test]
async fn test_get_session_full_and_missing() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;

    let (status, body) = send(&app, get(&format!("/api/session/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], id);
    assert_eq!(body["messages"], json!([]));

    let (status, body) = send(&app, get("/api/session/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");
}

// ===========================================================================
// TEST 4: POST /api/chat/:id - round robin across turns, title from first
// ===========================================================================
#[tokio::test]
async fn test_chat_rotates_answers_and_sets_title() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;
    let corpus = canned_answers();

    let questions = [
        "Show quarterly revenue analysis now please and more words",
        "what about satisfaction",
        "and market share",
    ];
    for (turn, q) in questions.iter().enumerate() {
        let (status, body) =
            send(&app, post_json(&format!("/api/chat/{}", id), &json!({ "question": q }))).await;
        assert_eq!(status, StatusCode::OK, "turn {turn}: {body}");
        assert_eq!(body["role"], "assistant");
        assert_eq!(body["answerId"], corpus[turn].id.to_string());
        assert_eq!(body["text"], corpus[turn].answer_text);
    }

    let (_, session) = send(&app, get(&format!("/api/session/{}", id))).await;
    assert_eq!(session["title"], "Show quarterly revenue analysis now please");
    assert_eq!(session["messages"].as_array().unwrap().len(), 6);
    assert_eq!(session["messages"][0]["role"], "user");
    assert_eq!(session["messages"][2]["text"], "what about satisfaction");
}

// ===========================================================================
// TEST 5: POST /api/chat/:id - wraparound after a full corpus cycle
// ===========================================================================
#[tokio::test]
async fn test_chat_wraps_after_corpus_size_turns() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;
    let corpus = canned_answers();

    let mut last = Value::Null;
    for turn in 0..=corpus.len() {
        let (status, body) = send(
            &app,
            post_json(&format!("/api/chat/{}", id), &json!({ "question": format!("q{turn}") })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["answerId"], corpus[0].id.to_string());
}

// ===========================================================================
// TEST 6: POST /api/chat/:id - validation errors
// ===========================================================================
#[tokio::test]
async fn test_chat_validation() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;
    let uri = format!("/api/chat/{}", id);

    let (status, body) = send(&app, post_json(&uri, &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question is required");

    let (status, _) = send(&app, post_json(&uri, &json!({ "question": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let raw = Request::builder()
        .method("POST")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Body::from("{ definitely not json"))
        .unwrap();
    let (status, body) = send(&app, raw).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question is required");

    let (status, body) = send(
        &app,
        post_json("/api/chat/unknown-session", &json!({ "question": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");

    let (_, session) = send(&app, get(&format!("/api/session/{}", id))).await;
    assert_eq!(session["messages"], json!([]), "rejected requests append nothing");
}

// ===========================================================================
// TEST 7: DELETE /api/session/:id - success then 404, count unchanged
// ===========================================================================
#[tokio::test]
async fn test_delete_session_then_not_found() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;

    let (status, body) = send(&app, delete(&format!("/api/session/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session deleted successfully");
    assert_eq!(body["sessionId"], id);

    let (status, body) = send(&app, delete(&format!("/api/session/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["requestedId"], id);
    assert_eq!(body["availableCount"], 2);

    let (_, list) = send(&app, get("/api/sessions")).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

// ===========================================================================
// TEST 8: store file is rewritten on every mutation
// ===========================================================================
#[tokio::test]
async fn test_mutations_reach_disk() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;

    send(&app, post_json(&format!("/api/chat/{}", id), &json!({ "question": "hello" }))).await;

    let data = std::fs::read_to_string(dir.path().join("sessions.json")).unwrap();
    let on_disk: Value = serde_json::from_str(&data).unwrap();
    let stored = on_disk
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["sessionId"] == id)
        .expect("session persisted");
    assert_eq!(stored["messages"].as_array().unwrap().len(), 2);
    assert_eq!(stored["title"], "hello");
}

// ===========================================================================
// TEST 9: corrupt file between requests falls back to seed data
// ===========================================================================
#[tokio::test]
async fn test_corrupt_store_recovers_to_seed() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    new_chat(&app).await;

    std::fs::write(dir.path().join("sessions.json"), "not json at all").unwrap();

    let (status, body) = send(&app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

// ===========================================================================
// TEST 10: concurrent chat requests lose no turns
// ===========================================================================
#[tokio::test]
async fn test_concurrent_chats_are_serialized() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;
    let id = new_chat(&app).await;

    let requests = (0..12).map(|i| {
        let app = app.clone();
        let uri = format!("/api/chat/{}", id);
        async move { send(&app, post_json(&uri, &json!({ "question": format!("q{i}") }))).await }
    });
    for (status, _) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::OK);
    }

    let (_, session) = send(&app, get(&format!("/api/session/{}", id))).await;
    assert_eq!(session["messages"].as_array().unwrap().len(), 24);
}

// ===========================================================================
// TEST 11: CORS - allowed origin echoed with credentials, others not
// ===========================================================================
#[tokio::test]
async fn test_cors_allow_list() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/sessions")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(preflight).await.unwrap();
    let headers = resp.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );

    let foreign = Request::builder()
        .method("GET")
        .uri("/api/sessions")
        .header("origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(foreign).await.unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

// ===========================================================================
// TEST 12: /health and /version
// ===========================================================================
#[tokio::test]
async fn test_health_and_version() {
    let dir = TempDir::new().unwrap();
    let app = make_app(&dir).await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sessions"], 2);

    let (status, body) = send(&app, get("/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["protocol"], "refchat/1");
}
