use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::table::Table;

/// Pre-authored response record. Never mutated after the corpus is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CannedAnswer {
    pub id: Uuid,
    pub answer_text: String,
    pub table: Table,
    pub metadata: serde_json::Value,
}
