use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

pub const DEFAULT_TITLE: &str = "New Chat";
const TITLE_WORDS: usize = 6;

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Row shown in the session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
    pub last_updated: DateTime<Utc>,
}

/// Reply to a new-chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            created_at: now,
            last_updated: Some(now),
            messages: Vec::new(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            title: self.title.clone(),
            last_updated: self.last_updated.unwrap_or(self.created_at),
        }
    }

    pub fn new_session_reply(&self) -> NewSession {
        NewSession {
            session_id: self.session_id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
        }
    }

    /// Append a message and bump `last_updated`. The first user message names the session.
    pub fn push(&mut self, message: Message) {
        if self.messages.is_empty() && message.is_user() {
            self.title = generate_title(&message.text);
        }
        self.messages.push(message);
        self.last_updated = Some(Utc::now());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// First six whitespace-separated words, or [`DEFAULT_TITLE`] for blank text.
pub fn generate_title(text: &str) -> String {
    let title = text
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_keeps_six_words() {
        assert_eq!(
            generate_title("Show quarterly revenue analysis now please"),
            "Show quarterly revenue analysis now please"
        );
        assert_eq!(
            generate_title("Show quarterly revenue analysis now please and more"),
            "Show quarterly revenue analysis now please"
        );
    }

    #[test]
    fn test_title_collapses_whitespace() {
        assert_eq!(generate_title("  market\t share \n  2024 "), "market share 2024");
    }

    #[test]
    fn test_blank_title_falls_back() {
        assert_eq!(generate_title(""), DEFAULT_TITLE);
        assert_eq!(generate_title("   \n "), DEFAULT_TITLE);
    }

    #[test]
    fn test_title_fixed_after_first_user_message() {
        let mut session = Session::new();
        session.push(Message::user("Employee satisfaction survey results"));
        session.push(Message::user("something else entirely"));
        assert_eq!(session.title, "Employee satisfaction survey results");
        assert_eq!(session.messages.len(), 2);
    }

    #[test]
    fn test_summary_falls_back_to_created_at() {
        let session: Session = serde_json::from_value(json!({
            "sessionId": "legacy-1",
            "title": "Legacy",
            "createdAt": "2025-11-01T08:00:00Z",
            "messages": []
        }))
        .unwrap();

        let summary = session.summary();
        assert_eq!(summary.last_updated, session.created_at);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["sessionId"], "legacy-1");
        assert!(value["lastUpdated"].is_string());
    }

    #[test]
    fn test_sparse_record_reads_with_defaults() {
        let session: Session = serde_json::from_value(json!({
            "sessionId": "sparse",
            "messages": [{"role": "assistant"}]
        }))
        .unwrap();

        assert_eq!(session.title, DEFAULT_TITLE);
        assert_eq!(session.created_at, DateTime::<Utc>::default());
        assert_eq!(session.messages[0].text, "");
        assert!(serde_json::from_value::<Session>(json!({"title": "no id"})).is_err());
    }

    #[test]
    fn test_new_session_is_empty_with_default_title() {
        let session = Session::new();
        assert!(session.messages.is_empty());
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(Uuid::parse_str(&session.session_id).is_ok());
    }
}
