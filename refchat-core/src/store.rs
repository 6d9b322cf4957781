//! JSON-file-backed session store.
//!
//! The whole collection lives in one file holding a JSON array of sessions.
//! Every operation reloads the file, applies its change in memory and
//! rewrites the file, all while holding the store mutex, so requests served
//! by one store instance never overwrite each other's changes. Separate
//! processes sharing a file are not coordinated.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::corpus::seed_sessions;
use crate::error::{ChatError, ChatResult};
use crate::models::{Message, Session, SessionSummary};
use crate::responder::ResponseSource;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Summaries in store order.
    async fn list(&self) -> ChatResult<Vec<SessionSummary>>;

    async fn get(&self, id: &str) -> ChatResult<Session>;

    /// Append a new empty session and return it.
    async fn create(&self) -> ChatResult<Session>;

    /// Append one message and return the updated session.
    async fn append_message(&self, id: &str, message: Message) -> ChatResult<Session>;

    /// Record a user question and the selected answer as one atomic turn.
    async fn exchange(
        &self,
        id: &str,
        question: &str,
        responder: &dyn ResponseSource,
    ) -> ChatResult<Message>;

    /// Remove a session. Returns the number of sessions left.
    async fn delete(&self, id: &str) -> ChatResult<usize>;

    async fn count(&self) -> ChatResult<usize>;
}

pub struct FileSessionStore {
    path: PathBuf,
    sessions: Mutex<Vec<Session>>,
}

impl FileSessionStore {
    /// Open the store at `path`, seeding the file if it is missing or unusable.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            sessions: Mutex::new(Vec::new()),
        };
        let loaded = store.load().await;
        tracing::info!(
            path = %store.path.display(),
            sessions = loaded,
            "Session store ready"
        );
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file into memory. Returns the number of sessions held.
    pub async fn load(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;
        sessions.len()
    }

    /// Overwrite the backing file with the in-memory collection.
    pub async fn save(&self) {
        let sessions = self.sessions.lock().await;
        self.persist(&sessions).await;
    }

    async fn reload(&self, sessions: &mut Vec<Session>) {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => match serde_json::from_str::<serde_json::Value>(&data) {
                Ok(serde_json::Value::Array(records)) => {
                    *sessions = self.decode_records(records);
                    tracing::debug!(
                        count = sessions.len(),
                        "Loaded sessions from {}",
                        self.path.display()
                    );
                    return;
                }
                Ok(_) => tracing::warn!(
                    "Sessions file {} does not contain an array, using seed sessions",
                    self.path.display()
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Sessions file {} is not valid JSON, using seed sessions",
                    self.path.display()
                ),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => tracing::info!(
                "Sessions file {} not found, using seed sessions",
                self.path.display()
            ),
            Err(e) => tracing::error!(
                error = %e,
                "Failed to read sessions file {}, using seed sessions",
                self.path.display()
            ),
        }

        *sessions = seed_sessions();
        self.persist(sessions).await;
    }

    /// Keep every record that parses as a session. Unusable records are skipped
    /// and dropped from the file on the next write.
    fn decode_records(&self, records: Vec<serde_json::Value>) -> Vec<Session> {
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Session>(record) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(
                        index,
                        error = %e,
                        "Skipping malformed session record in {}",
                        self.path.display()
                    );
                    None
                }
            })
            .collect()
    }

    /// Write failures are logged, never returned: the in-memory copy stays authoritative
    /// until the next reload.
    async fn persist(&self, sessions: &[Session]) {
        if let Err(e) = self.write_file(sessions).await {
            tracing::error!(
                error = %e,
                "Failed to save sessions to {}",
                self.path.display()
            );
        }
    }

    async fn write_file(&self, sessions: &[Session]) -> ChatResult<()> {
        let json = serde_json::to_string_pretty(sessions)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

fn position(sessions: &[Session], id: &str) -> ChatResult<usize> {
    sessions
        .iter()
        .position(|s| s.session_id == id)
        .ok_or_else(|| ChatError::NotFound(id.to_string()))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn list(&self) -> ChatResult<Vec<SessionSummary>> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;
        Ok(sessions.iter().map(Session::summary).collect())
    }

    async fn get(&self, id: &str) -> ChatResult<Session> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;
        let idx = position(&sessions, id)?;
        Ok(sessions[idx].clone())
    }

    async fn create(&self) -> ChatResult<Session> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;

        let mut session = Session::new();
        while sessions.iter().any(|s| s.session_id == session.session_id) {
            session.session_id = Uuid::new_v4().to_string();
        }
        sessions.push(session.clone());
        self.persist(&sessions).await;

        tracing::info!(session_id = %session.session_id, "Created session");
        Ok(session)
    }

    async fn append_message(&self, id: &str, message: Message) -> ChatResult<Session> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;

        let idx = position(&sessions, id)?;
        sessions[idx].push(message);
        let updated = sessions[idx].clone();
        self.persist(&sessions).await;
        Ok(updated)
    }

    async fn exchange(
        &self,
        id: &str,
        question: &str,
        responder: &dyn ResponseSource,
    ) -> ChatResult<Message> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;

        let idx = position(&sessions, id)?;
        let session = &mut sessions[idx];
        session.push(Message::user(question));
        let answer = responder.next(session);
        let reply = Message::assistant(&answer);
        session.push(reply.clone());

        tracing::debug!(
            session_id = %id,
            answer_id = %answer.id,
            messages = session.messages.len(),
            "Recorded chat turn"
        );
        self.persist(&sessions).await;
        Ok(reply)
    }

    async fn delete(&self, id: &str) -> ChatResult<usize> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;

        let idx = match position(&sessions, id) {
            Ok(idx) => idx,
            Err(e) => {
                tracing::warn!(
                    session_id = %id,
                    available = sessions.len(),
                    "Delete requested for unknown session"
                );
                return Err(e);
            }
        };
        sessions.remove(idx);
        self.persist(&sessions).await;

        tracing::info!(session_id = %id, remaining = sessions.len(), "Deleted session");
        Ok(sessions.len())
    }

    async fn count(&self) -> ChatResult<usize> {
        let mut sessions = self.sessions.lock().await;
        self.reload(&mut sessions).await;
        Ok(sessions.len())
    }
}
