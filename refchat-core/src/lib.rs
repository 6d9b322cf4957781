pub mod config;
pub mod corpus;
pub mod error;
pub mod models;
pub mod responder;
pub mod store;

pub use config::RefchatConfig;
pub use error::{ChatError, ChatResult};
pub use models::{CannedAnswer, Message, NewSession, Role, Session, SessionSummary, Table};
pub use responder::{ResponseSource, RoundRobin};
pub use store::{FileSessionStore, SessionStore};
