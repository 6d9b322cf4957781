//! RefChat HTTP REST API
//!
//! Axum-based HTTP server exposing chat sessions to the browser client.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to an
//! inner function returning `(StatusCode, json)`. The inner functions take the
//! store and responder directly and are tested without axum dispatch.
//!
//! Endpoints:
//! - GET    /health            - health check with store status
//! - GET    /version           - server version info
//! - GET    /api/sessions      - session summaries, store order
//! - GET    /api/new-chat      - create an empty session
//! - GET    /api/session/:id   - full session
//! - POST   /api/chat/:id      - ask a question, returns the assistant message
//! - DELETE /api/session/:id   - delete a session

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use refchat_core::{
    ChatError, FileSessionStore, RefchatConfig, ResponseSource, RoundRobin, SessionStore,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub store: Arc<dyn SessionStore>,
    pub responder: Arc<dyn ResponseSource>,
    pub config: RefchatConfig,
}

impl HttpState {
    /// Open the configured store file and use the built-in corpus.
    pub async fn from_config(config: RefchatConfig) -> Self {
        let store = FileSessionStore::open(&config.store.path).await;
        Self {
            store: Arc::new(store),
            responder: Arc::new(RoundRobin::with_builtin_corpus()),
            config,
        }
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    let cors = cors_layer(&state.config.http.allowed_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/api/sessions", get(list_sessions_handler))
        .route("/api/new-chat", get(new_chat_handler))
        .route(
            "/api/session/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/api/chat/:id", post(chat_handler))
        .layer(cors)
        .with_state(state)
}

/// Credentialed CORS restricted to `origins`. Requests without an Origin header pass through.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring invalid allowed origin {:?}: {}", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    config: RefchatConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = config.bind_addr();
    let state = Arc::new(HttpState::from_config(config).await);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("RefChat HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check - counts sessions and reports the store location.
pub async fn health_inner(store: &dyn SessionStore, store_path: &str) -> (StatusCode, Value) {
    match store.count().await {
        Ok(sessions) => (
            StatusCode::OK,
            json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "sessions": sessions,
                "store": store_path,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version - returns version info (pure, no IO).
pub fn version_inner() -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "refchat/1",
    })
}

pub async fn list_sessions_inner(store: &dyn SessionStore) -> (StatusCode, Value) {
    match store.list().await {
        Ok(summaries) => (StatusCode::OK, json!(summaries)),
        Err(e) => error_response(&e, "Failed to fetch sessions"),
    }
}

pub async fn new_chat_inner(store: &dyn SessionStore) -> (StatusCode, Value) {
    match store.create().await {
        Ok(session) => (StatusCode::OK, json!(session.new_session_reply())),
        Err(e) => error_response(&e, "Failed to create new chat"),
    }
}

pub async fn get_session_inner(store: &dyn SessionStore, id: &str) -> (StatusCode, Value) {
    match store.get(id).await {
        Ok(session) => (StatusCode::OK, json!(session)),
        Err(e) => error_response(&e, "Failed to fetch session"),
    }
}

/// Inner chat - an unknown session wins over a bad question, then the turn is recorded.
pub async fn chat_inner(
    store: &dyn SessionStore,
    responder: &dyn ResponseSource,
    id: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let question = match question_from(body.as_ref()) {
        Some(q) => q,
        None => {
            if let Err(e) = store.get(id).await {
                return error_response(&e, "Failed to process chat message");
            }
            return error_response(
                &ChatError::InvalidInput("Question is required".to_string()),
                "Failed to process chat message",
            );
        }
    };

    match store.exchange(id, question, responder).await {
        Ok(reply) => (StatusCode::OK, json!(reply)),
        Err(e) => {
            if !matches!(e, ChatError::NotFound(_)) {
                tracing::error!("Error processing chat: {}", e);
            }
            error_response(&e, "Failed to process chat message")
        }
    }
}

pub async fn delete_session_inner(store: &dyn SessionStore, id: &str) -> (StatusCode, Value) {
    match store.delete(id).await {
        Ok(_) => (
            StatusCode::OK,
            json!({
                "message": "Session deleted successfully",
                "sessionId": id,
            }),
        ),
        Err(ChatError::NotFound(_)) => {
            let available = store.count().await.unwrap_or(0);
            (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Session not found",
                    "requestedId": id,
                    "availableCount": available,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Error deleting session {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to delete session",
                    "details": e.to_string(),
                }),
            )
        }
    }
}

// ============================================================================
// Axum handler wrappers (thin - delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store.as_ref(), &state.config.store.path).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn list_sessions_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = list_sessions_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn new_chat_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = new_chat_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn get_session_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (status, body) = get_session_inner(state.store.as_ref(), &id).await;
    (status, Json(body))
}

pub async fn chat_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(Json(v)) => Some(v),
        Err(e) => {
            tracing::debug!("Unreadable chat body for {}: {}", id, e);
            None
        }
    };
    let (status, body) =
        chat_inner(state.store.as_ref(), state.responder.as_ref(), &id, body).await;
    (status, Json(body))
}

pub async fn delete_session_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (status, body) = delete_session_inner(state.store.as_ref(), &id).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// A non-empty string `question` field, if the body has one.
pub fn question_from(body: Option<&Value>) -> Option<&str> {
    body.and_then(|b| b.get("question"))
        .and_then(Value::as_str)
        .filter(|q| !q.is_empty())
}

/// Map a store error to an HTTP status and `{error}` body. `fallback` names server-side failures.
pub fn error_response(err: &ChatError, fallback: &str) -> (StatusCode, Value) {
    match err {
        ChatError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            json!({ "error": "Session not found" }),
        ),
        ChatError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
        other => {
            tracing::error!("{}: {}", fallback, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": fallback }),
            )
        }
    }
}

// ============================================================================
// Unit Tests - call inner functions directly
// ============================================================================
