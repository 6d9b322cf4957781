//! RefChat client: API calls, the chat window's optimistic message cache,
//! the session list and plain-text rendering.

pub mod api;
pub mod conversation;
pub mod render;
pub mod sidebar;

pub use api::{AssistantReply, ChatApi, ClientError, HttpChatApi, DEFAULT_SERVER};
pub use conversation::{ChatWindow, Completion, SendBlocked, SendState, SendTicket};
pub use sidebar::{Confirm, DeleteOutcome, SessionList, DELETE_PROMPT};
