//! Canned-answer selection.
//!
//! The router never indexes the corpus itself; it asks a [`ResponseSource`]
//! for the answer to the turn that was just appended, so the selection
//! policy can be swapped without touching storage.

use crate::error::{ChatError, ChatResult};
use crate::models::{CannedAnswer, Session};

pub trait ResponseSource: Send + Sync {
    /// Answer for `session`, whose latest message is the user's question.
    fn next(&self, session: &Session) -> CannedAnswer;
}

/// Cycles through a fixed corpus, one answer per user turn.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    corpus: Vec<CannedAnswer>,
}

impl RoundRobin {
    pub fn new(corpus: Vec<CannedAnswer>) -> ChatResult<Self> {
        if corpus.is_empty() {
            return Err(ChatError::InvalidInput(
                "response corpus must not be empty".to_string(),
            ));
        }
        Ok(Self { corpus })
    }

    pub fn with_builtin_corpus() -> Self {
        Self {
            corpus: crate::corpus::canned_answers(),
        }
    }

    /// Corpus index for a session holding `message_count` messages after the user append.
    pub fn index_for(&self, message_count: usize) -> usize {
        (message_count.saturating_sub(1) / 2) % self.corpus.len()
    }
}

impl ResponseSource for RoundRobin {
    fn next(&self, session: &Session) -> CannedAnswer {
        self.corpus[self.index_for(session.messages.len())].clone()
    }
}
