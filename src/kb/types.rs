//! Record types for the knowledge-base tables.

use serde::{Deserialize, Serialize};

/// A question/answer pair, matching the `qa_kb` table.
///
/// Never mutated by the retrieval pass; edits go through [`crate::kb::store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Autoincrement primary key assigned by the store.
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-modification timestamp.
    pub updated_at: String,
}

/// One page of entries plus the total row count.
#[derive(Debug, Serialize)]
pub struct EntryPage {
    pub items: Vec<KnowledgeEntry>,
    pub total: i64,
}

/// The active system prompt, matching the newest `ai_settings` row.
#[derive(Debug, Clone, Serialize)]
pub struct SystemPromptSetting {
    pub system: String,
    pub updated_at: Option<String>,
}
