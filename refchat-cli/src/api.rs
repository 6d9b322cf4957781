//! HTTP client for the RefChat REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use refchat_core::{Message, NewSession, Role, Session, SessionSummary, Table};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SERVER: &str = "http://localhost:5000";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection failed to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to parse response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

/// Assistant message as returned by `POST /api/chat/:id`.
///
/// Older servers used `answerText`/`answer` and `id`; all spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub text: Option<String>,
    pub answer_text: Option<String>,
    pub answer: Option<String>,
    pub table: Option<Table>,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: Option<DateTime<Utc>>,
    pub answer_id: Option<String>,
    pub id: Option<String>,
}

impl AssistantReply {
    pub fn into_message(self) -> Message {
        let text = [self.text, self.answer_text, self.answer]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .unwrap_or_default();
        Message {
            role: Role::Assistant,
            text,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            table: self.table,
            metadata: self.metadata,
            answer_id: self.answer_id.or(self.id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReply {
    pub message: String,
    pub session_id: Option<String>,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ClientError>;

    async fn create_session(&self) -> Result<NewSession, ClientError>;

    async fn get_session(&self, id: &str) -> Result<Session, ClientError>;

    async fn ask(&self, id: &str, question: &str) -> Result<AssistantReply, ClientError>;

    async fn delete_session(&self, id: &str) -> Result<DeleteReply, ClientError>;
}

pub struct HttpChatApi {
    base: String,
    client: reqwest::Client,
}

impl HttpChatApi {
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let base = base.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| ClientError::Transport {
                url: base.clone(),
                source,
            })?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let resp = request.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        tracing::warn!(%url, status = status.as_u16(), "Request failed: {}", message);
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        let resp = self.execute(&url, self.client.get(&url)).await?;
        resp.json()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ClientError> {
        self.get_json("/api/sessions").await
    }

    async fn create_session(&self) -> Result<NewSession, ClientError> {
        self.get_json("/api/new-chat").await
    }

    async fn get_session(&self, id: &str) -> Result<Session, ClientError> {
        self.get_json(&format!("/api/session/{}", id)).await
    }

    async fn ask(&self, id: &str, question: &str) -> Result<AssistantReply, ClientError> {
        let url = self.url(&format!("/api/chat/{}", id));
        let request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "question": question }));
        let resp = self.execute(&url, request).await?;
        resp.json()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }

    async fn delete_session(&self, id: &str) -> Result<DeleteReply, ClientError> {
        let url = self.url(&format!("/api/session/{}", id));
        let resp = self.execute(&url, self.client.delete(&url)).await?;

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if !is_json {
            return Ok(DeleteReply {
                message: "Session deleted successfully".to_string(),
                session_id: Some(id.to_string()),
            });
        }
        resp.json()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }
}

// ============================================================================
// Tests
// ============================================================================
