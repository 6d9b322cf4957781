//! Active-session message cache with optimistic sends.
//!
//! A send moves through `Idle -> Pending -> Committed | RolledBack`. The
//! user's message is shown as soon as the send begins; if the request fails
//! it is removed again so the list only ever reflects confirmed state.
//! Opening another session bumps the generation, and completions carrying
//! an older generation are dropped.

use refchat_core::Message;
use thiserror::Error;

use crate::api::{AssistantReply, ChatApi, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Pending,
    Committed,
    RolledBack,
}

/// Handle for one in-flight send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    generation: u64,
    session_id: String,
    /// Length of the message list before the optimistic append.
    rollback_len: usize,
}

impl SendTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBlocked {
    #[error("no session is open")]
    NoSession,
    #[error("a message is already being sent")]
    Busy,
    #[error("question is empty")]
    EmptyQuestion,
}

#[derive(Debug)]
pub enum Completion {
    /// The assistant reply was appended.
    Committed(Message),
    /// The request failed and the optimistic message was removed.
    RolledBack(ClientError),
    /// The window moved on before the reply arrived; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct ChatWindow {
    session_id: Option<String>,
    messages: Vec<Message>,
    state: SendState,
    generation: u64,
}

impl Default for ChatWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWindow {
    pub fn new() -> Self {
        Self {
            session_id: None,
            messages: Vec::new(),
            state: SendState::Idle,
            generation: 0,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == SendState::Pending
    }

    /// Switch to `session_id` with the given history, abandoning any pending send.
    pub fn open(&mut self, session_id: impl Into<String>, messages: Vec<Message>) {
        self.generation += 1;
        self.session_id = Some(session_id.into());
        self.messages = messages;
        self.state = SendState::Idle;
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.session_id = None;
        self.messages.clear();
        self.state = SendState::Idle;
    }

    /// Fetch and show a session. On failure the window stays on `id` with no messages.
    pub async fn load(&mut self, api: &dyn ChatApi, id: &str) -> Result<(), ClientError> {
        self.open(id, Vec::new());
        match api.get_session(id).await {
            Ok(session) => {
                self.messages = session.messages;
                Ok(())
            }
            Err(e) => {
                tracing::error!(session_id = %id, "Failed to load session: {}", e);
                Err(e)
            }
        }
    }

    /// Optimistically append the user's question. The question is trimmed.
    pub fn begin_send(&mut self, question: &str) -> Result<SendTicket, SendBlocked> {
        let session_id = self.session_id.clone().ok_or(SendBlocked::NoSession)?;
        if self.is_sending() {
            return Err(SendBlocked::Busy);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(SendBlocked::EmptyQuestion);
        }

        let ticket = SendTicket {
            generation: self.generation,
            session_id,
            rollback_len: self.messages.len(),
        };
        self.messages.push(Message::user(question));
        self.state = SendState::Pending;
        Ok(ticket)
    }

    /// Apply the outcome of the request started by `ticket`.
    pub fn complete(
        &mut self,
        ticket: SendTicket,
        result: Result<AssistantReply, ClientError>,
    ) -> Completion {
        if ticket.generation != self.generation || self.state != SendState::Pending {
            tracing::debug!(
                session_id = %ticket.session_id,
                "Dropping reply for a send the window no longer tracks"
            );
            return Completion::Stale;
        }

        match result {
            Ok(reply) => {
                let message = reply.into_message();
                self.messages.push(message.clone());
                self.state = SendState::Committed;
                Completion::Committed(message)
            }
            Err(e) => {
                tracing::error!(session_id = %ticket.session_id, "Failed to send message: {}", e);
                self.messages.truncate(ticket.rollback_len);
                self.state = SendState::RolledBack;
                Completion::RolledBack(e)
            }
        }
    }

    /// Begin a send, call the API and apply the result.
    pub async fn send(
        &mut self,
        api: &dyn ChatApi,
        question: &str,
    ) -> Result<Completion, SendBlocked> {
        let ticket = self.begin_send(question)?;
        let question = self.messages[ticket.rollback_len].text.clone();
        let result = api.ask(ticket.session_id(), &question).await;
        Ok(self.complete(ticket, result))
    }
}
