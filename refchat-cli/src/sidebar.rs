//! Session list: summaries, new-chat and confirmed deletion.

use refchat_core::{NewSession, SessionSummary};

use crate::api::{ChatApi, ClientError};

pub const DELETE_PROMPT: &str =
    "Are you sure you want to delete this chat? This action cannot be undone.";

/// Asks the user before a destructive call.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; no request was sent.
    Cancelled,
    Deleted,
    /// The open session was deleted; the caller should leave it.
    DeletedActive,
}

#[derive(Debug, Default)]
pub struct SessionList {
    sessions: Vec<SessionSummary>,
    loaded: bool,
}

impl SessionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    /// False until the first successful refresh.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_active(&self, id: &str, active: Option<&str>) -> bool {
        active == Some(id)
    }

    /// Re-fetch summaries. On failure the previous list is kept.
    pub async fn refresh(&mut self, api: &dyn ChatApi) -> Result<(), ClientError> {
        match api.list_sessions().await {
            Ok(sessions) => {
                self.sessions = sessions;
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load sessions: {}", e);
                Err(e)
            }
        }
    }

    /// Create a session and refresh the list so it shows up.
    pub async fn create(&mut self, api: &dyn ChatApi) -> Result<NewSession, ClientError> {
        let created = api.create_session().await.map_err(|e| {
            tracing::error!("Failed to create new chat: {}", e);
            e
        })?;
        if let Err(e) = self.refresh(api).await {
            tracing::warn!(
                session_id = %created.session_id,
                "Session list not refreshed after create: {}",
                e
            );
        }
        Ok(created)
    }

    /// Delete `id` after confirmation, then refresh.
    pub async fn delete(
        &mut self,
        api: &dyn ChatApi,
        id: &str,
        confirm: &dyn Confirm,
        active: Option<&str>,
    ) -> Result<DeleteOutcome, ClientError> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let reply = api.delete_session(id).await.map_err(|e| {
            tracing::error!(session_id = %id, "Failed to delete session: {}", e);
            e
        })?;
        tracing::info!(session_id = %id, "{}", reply.message);

        self.sessions.retain(|s| s.session_id != id);
        if let Err(e) = self.refresh(api).await {
            tracing::warn!(session_id = %id, "Session list not refreshed after delete: {}", e);
        }
        if self.is_active(id, active) {
            Ok(DeleteOutcome::DeletedActive)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}
