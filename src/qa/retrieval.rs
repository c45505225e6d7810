//! Best-match retrieval: bigram cosine plus exact/substring bonuses.
//!
//! Scores are ranking scores, not probabilities. Cosine is bounded by 1.0 but
//! the bonuses are additive, so an exact match scores about 1.2.

use serde::Serialize;

use super::text::BigramVector;
use super::KnowledgeSource;
use crate::config::RetrievalConfig;
use crate::kb::types::KnowledgeEntry;

/// Best entry for a query and its bonus-inclusive score.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub entry: Option<KnowledgeEntry>,
    pub score: f64,
}

impl RetrievalResult {
    pub fn none() -> Self {
        Self {
            entry: None,
            score: 0.0,
        }
    }
}

/// Score a single entry. `query` must already be trimmed.
pub fn score_entry(
    query: &str,
    query_vec: &BigramVector,
    entry: &KnowledgeEntry,
    config: &RetrievalConfig,
) -> f64 {
    let question = entry.question.trim();
    let mut score = query_vec.cosine(&BigramVector::from_text(&entry.question));
    if question == query {
        score += config.exact_bonus;
    } else if question.contains(query) {
        score += config.substring_bonus;
    }
    score
}

/// Scan `entries` in order and keep the highest score. Only a strictly greater
/// score replaces the current best, so the earlier entry wins ties; with the
/// store's newest-first ordering that is the most recently created one.
pub fn best_match(
    entries: &[KnowledgeEntry],
    query: &str,
    config: &RetrievalConfig,
) -> RetrievalResult {
    let query = query.trim();
    let query_vec = BigramVector::from_text(query);

    let mut best: Option<&KnowledgeEntry> = None;
    let mut best_score = 0.0;
    for entry in entries {
        let score = score_entry(query, &query_vec, entry, config);
        if score > best_score {
            best_score = score;
            best = Some(entry);
        }
    }

    RetrievalResult {
        entry: best.cloned(),
        score: best_score,
    }
}

/// Load every entry from `source` and return the best match. A store failure
/// is logged and reported as no match.
pub fn retrieve_best(
    source: &dyn KnowledgeSource,
    query: &str,
    config: &RetrievalConfig,
) -> RetrievalResult {
    let entries = match source.load_entries() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "failed to load knowledge base");
            return RetrievalResult::none();
        }
    };
    if entries.is_empty() {
        return RetrievalResult::none();
    }

    let result = best_match(&entries, query, config);
    tracing::debug!(
        candidates = entries.len(),
        matched = result.entry.as_ref().map(|e| e.id),
        score = result.score,
        "retrieval finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, question: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            id,
            question: question.into(),
            answer: format!("answer {id}"),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn exact_match_gets_full_bonus() {
        let entries = vec![entry(2, "今天天气怎么样"), entry(1, "你好吗")];
        let result = best_match(&entries, "你好吗", &RetrievalConfig::default());
        assert_eq!(result.entry.unwrap().id, 1);
        assert!((result.score - 1.2).abs() < 1e-9);
    }

    #[test]
    fn exact_match_ignores_surrounding_whitespace() {
        let entries = vec![entry(1, "  你好吗 ")];
        let result = best_match(&entries, " 你好吗", &RetrievalConfig::default());
        assert!(result.score > 1.0);
    }

    #[test]
    fn substring_bonus_is_smaller_than_exact() {
        let config = RetrievalConfig::default();
        let query = "天气";
        let q_vec = BigramVector::from_text(query);
        let sub = entry(1, "今天天气怎么样");

        let cos = q_vec.cosine(&BigramVector::from_text(&sub.question));
        let score = score_entry(query, &q_vec, &sub, &config);
        assert!((score - (cos + 0.1)).abs() < 1e-9);
        assert!(score < cos + config.exact_bonus);
    }

    #[test]
    fn first_entry_wins_ties() {
        let entries = vec![entry(9, "退货流程"), entry(3, "退货流程")];
        let result = best_match(&entries, "退货流程", &RetrievalConfig::default());
        assert_eq!(result.entry.unwrap().id, 9);
    }

    #[test]
    fn zero_scores_select_nothing() {
        let entries = vec![entry(1, "abc"), entry(2, "def")];
        let result = best_match(&entries, "xyz", &RetrievalConfig::default());
        assert!(result.entry.is_none());
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn empty_entry_list_returns_none() {
        let result = best_match(&[], "anything", &RetrievalConfig::default());
        assert!(result.entry.is_none());
        assert_eq!(result.score, 0.0);
    }
}
