//! Question answering over the local knowledge base.
//!
//! - [`text`] normalizes text and builds bigram vectors
//! - [`retrieval`] scores every entry against a query and keeps the best
//! - [`answer`] turns the best match into a reply, optionally refined by an
//!   [`AnswerGenerator`](crate::llm::AnswerGenerator)

pub mod answer;
pub mod retrieval;
pub mod text;

use anyhow::Result;

use crate::kb::types::KnowledgeEntry;

/// Read side of the knowledge base, as seen by the QA core.
///
/// Failures are recoverable: callers treat them as "no data".
pub trait KnowledgeSource: Send + Sync {
    /// All entries, newest id first.
    fn load_entries(&self) -> Result<Vec<KnowledgeEntry>>;

    /// The configured system prompt, `None` if unset.
    fn system_prompt(&self) -> Result<Option<String>>;
}
