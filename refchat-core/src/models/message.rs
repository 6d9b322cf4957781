use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::CannedAnswer;
use super::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub text: String,
    /// Records written without a timestamp read back as the Unix epoch.
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Only set on assistant messages: the canned answer they were built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            table: None,
            metadata: None,
            answer_id: None,
        }
    }

    pub fn assistant(answer: &CannedAnswer) -> Self {
        Self {
            role: Role::Assistant,
            text: answer.answer_text.clone(),
            timestamp: Utc::now(),
            table: Some(answer.table.clone()),
            metadata: Some(answer.metadata.clone()),
            answer_id: Some(answer.id.to_string()),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
