//! Answer composition with graceful degradation.
//!
//! [`QaService::answer_question`] never fails. Depending on what is available the
//! reply comes from, in order: the language model grounded on the matched
//! entry, the stored answer verbatim, the language model without a match, or
//! a fixed "no match" message.

use serde::Serialize;

use super::retrieval::{self, RetrievalResult};
use super::KnowledgeSource;
use crate::config::RetrievalConfig;
use crate::llm::{AnswerGenerator, GenerateError, GenerationRequest};

/// Reply for blank questions.
pub const EMPTY_QUESTION_REPLY: &str = "请输入问题";

/// Reply when nothing matched and the language model is unavailable.
pub const NO_MATCH_REPLY: &str = "暂未命中知识库，请补充条目或调整问题";

/// Context placeholder sent to the language model when nothing matched.
pub const NO_MATCH_CONTEXT: &str = "（未命中知识库）";

/// System prompt used when neither the caller nor the settings store supplies one.
pub const FALLBACK_SYSTEM_PROMPT: &str = "你是知识库问答助手，请基于给定的知识库答案，\
提供准确、礼貌、简洁的中文回复；如答案不足以覆盖问题，请说明需要更多信息或建议补充知识库。";

/// The reply plus match metadata.
///
/// `score` is the retrieval score, bonus included, whichever source produced
/// `answer`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnswerResult {
    pub answer: String,
    pub matched_id: Option<i64>,
    pub matched_question: Option<String>,
    pub score: f64,
}

/// Knowledge-base QA with an injected store and answer generator.
pub struct QaService {
    source: Box<dyn KnowledgeSource>,
    generator: Box<dyn AnswerGenerator>,
    config: RetrievalConfig,
}

impl QaService {
    pub fn new(
        source: Box<dyn KnowledgeSource>,
        generator: Box<dyn AnswerGenerator>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            source,
            generator,
            config,
        }
    }

    pub fn retrieve_best(&self, question: &str) -> RetrievalResult {
        retrieval::retrieve_best(self.source.as_ref(), question, &self.config)
    }

    /// The stored system prompt, or [`FALLBACK_SYSTEM_PROMPT`] if none is set
    /// or the store cannot be read.
    pub fn default_system_prompt(&self) -> String {
        match self.source.system_prompt() {
            Ok(Some(prompt)) => prompt,
            Ok(None) => FALLBACK_SYSTEM_PROMPT.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read system prompt, using built-in default");
                FALLBACK_SYSTEM_PROMPT.to_string()
            }
        }
    }

    pub fn answer_question(&self, question: &str, system: Option<&str>) -> AnswerResult {
        let question = question.trim();
        if question.is_empty() {
            return AnswerResult {
                answer: EMPTY_QUESTION_REPLY.to_string(),
                matched_id: None,
                matched_question: None,
                score: 0.0,
            };
        }

        let RetrievalResult { entry, score } = self.retrieve_best(question);
        let system = match system.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.to_string(),
            None => self.default_system_prompt(),
        };

        match entry {
            Some(entry) if score >= self.config.match_threshold => {
                let generated = self.generate(&GenerationRequest {
                    system: &system,
                    question,
                    context: &entry.answer,
                });
                let answer = match generated {
                    Some(text) if text.chars().count() >= self.config.min_generated_chars => text,
                    Some(text) => {
                        tracing::debug!(len = text.chars().count(), "generated answer too short, using stored answer");
                        entry.answer
                    }
                    None => entry.answer,
                };
                tracing::info!(id = entry.id, score, "question answered from knowledge base");
                AnswerResult {
                    answer,
                    matched_id: Some(entry.id),
                    matched_question: Some(entry.question),
                    score,
                }
            }
            _ => {
                let generated = self.generate(&GenerationRequest {
                    system: &system,
                    question,
                    context: NO_MATCH_CONTEXT,
                });
                tracing::info!(score, generated = generated.is_some(), "no knowledge base match");
                AnswerResult {
                    answer: generated.unwrap_or_else(|| NO_MATCH_REPLY.to_string()),
                    matched_id: None,
                    matched_question: None,
                    score,
                }
            }
        }
    }

    /// Run the generator, logging and discarding any failure.
    fn generate(&self, request: &GenerationRequest<'_>) -> Option<String> {
        match self.generator.generate(request) {
            Ok(text) => Some(text),
            Err(GenerateError::Disabled) => None,
            Err(e @ (GenerateError::Transport(_) | GenerateError::Status(_))) => {
                tracing::warn!(generator = self.generator.name(), error = %e, "language model call failed");
                None
            }
            Err(e) => {
                tracing::error!(generator = self.generator.name(), error = %e, "unexpected language model response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::types::KnowledgeEntry;
    use crate::llm::NullGenerator;
    use std::sync::Mutex;

    struct FixedSource {
        entries: Vec<KnowledgeEntry>,
        prompt: Option<String>,
    }

    impl KnowledgeSource for FixedSource {
        fn load_entries(&self) -> anyhow::Result<Vec<KnowledgeEntry>> {
            Ok(self.entries.clone())
        }

        fn system_prompt(&self) -> anyhow::Result<Option<String>> {
            Ok(self.prompt.clone())
        }
    }

    /// Records every request and replies with a canned string.
    struct Recording {
        reply: &'static str,
        seen: std::sync::Arc<Mutex<Vec<(String, String)>>>,
    }

    impl AnswerGenerator for Recording {
        fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerateError> {
            self.seen
                .lock()
                .unwrap()
                .push((request.system.to_string(), request.context.to_string()));
            Ok(self.reply.to_string())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn entry(id: i64, question: &str, answer: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            id,
            question: question.into(),
            answer: answer.into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn source(prompt: Option<&str>) -> Box<FixedSource> {
        Box::new(FixedSource {
            entries: vec![entry(1, "营业时间是什么时候", "每天九点到晚上六点")],
            prompt: prompt.map(String::from),
        })
    }

    fn recording(reply: &'static str) -> (Box<Recording>, std::sync::Arc<Mutex<Vec<(String, String)>>>) {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(Recording {
                reply,
                seen: seen.clone(),
            }),
            seen,
        )
    }

    #[test]
    fn blank_question_short_circuits() {
        let (generator, seen) = recording("should not be used");
        let svc = QaService::new(source(None), generator, RetrievalConfig::default());
        let res = svc.answer_question("   ", None);
        assert_eq!(res.answer, EMPTY_QUESTION_REPLY);
        assert_eq!(res.matched_id, None);
        assert_eq!(res.score, 0.0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn generated_answer_replaces_stored_answer() {
        let (generator, seen) = recording("我们每天 9:00-18:00 营业。");
        let svc = QaService::new(source(Some("db prompt")), generator, RetrievalConfig::default());
        let res = svc.answer_question("营业时间是什么时候", None);
        assert_eq!(res.answer, "我们每天 9:00-18:00 营业。");
        assert_eq!(res.matched_id, Some(1));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], ("db prompt".to_string(), "每天九点到晚上六点".to_string()));
    }

    #[test]
    fn short_generated_answer_falls_back_to_stored() {
        let (generator, _) = recording("好的");
        let svc = QaService::new(source(None), generator, RetrievalConfig::default());
        let res = svc.answer_question("营业时间是什么时候", None);
        assert_eq!(res.answer, "每天九点到晚上六点");
        assert_eq!(res.matched_question.as_deref(), Some("营业时间是什么时候"));
    }

    #[test]
    fn caller_prompt_overrides_stored_prompt() {
        let (generator, seen) = recording("答复内容足够长");
        let svc = QaService::new(source(Some("db prompt")), generator, RetrievalConfig::default());
        svc.answer_question("营业时间", Some("  caller prompt "));
        assert_eq!(seen.lock().unwrap()[0].0, "caller prompt");
    }

    #[test]
    fn missing_stored_prompt_uses_fallback() {
        let svc = QaService::new(source(None), Box::new(NullGenerator), RetrievalConfig::default());
        assert_eq!(svc.default_system_prompt(), FALLBACK_SYSTEM_PROMPT);
    }

    #[test]
    fn no_match_asks_generator_with_placeholder() {
        let (generator, seen) = recording("这个问题知识库里没有");
        let svc = QaService::new(source(None), generator, RetrievalConfig::default());
        let res = svc.answer_question("xyz", None);
        assert_eq!(res.answer, "这个问题知识库里没有");
        assert_eq!(res.matched_id, None);
        assert_eq!(seen.lock().unwrap()[0].1, NO_MATCH_CONTEXT);
    }

    #[test]
    fn no_match_without_generator_uses_fixed_reply() {
        let svc = QaService::new(source(None), Box::new(NullGenerator), RetrievalConfig::default());
        let res = svc.answer_question("xyz", None);
        assert_eq!(res.answer, NO_MATCH_REPLY);
        assert_eq!(res.matched_question, None);
    }
}
