//! External answer generation.
//!
//! Provides the [`AnswerGenerator`] trait, a [`NullGenerator`] used when no
//! language model is configured, and [`chat::ChatCompletionGenerator`] for
//! OpenAI-compatible chat-completion endpoints. The implementation is chosen
//! once at startup via [`create_generator`].

pub mod chat;
pub mod credentials;

use thiserror::Error;

use crate::config::LlmConfig;

/// Why a generation attempt produced no text.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no language model configured")]
    Disabled,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("empty completion")]
    Empty,
}

/// Inputs for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system: &'a str,
    pub question: &'a str,
    /// Grounding text: the matched stored answer, or a no-hit placeholder.
    pub context: &'a str,
}

impl GenerationRequest<'_> {
    /// The user turn sent to the model.
    pub fn user_message(&self) -> String {
        format!(
            "问题：{}\n知识库参考答案：{}\n请用中文回答，并尽量保持简洁与可执行。",
            self.question, self.context
        )
    }
}

/// Produces an answer from a question plus grounding context.
///
/// Calls are synchronous and may block for the configured timeout; callers in
/// async contexts should use `tokio::task::spawn_blocking`. A successful result
/// is trimmed and non-empty.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerateError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Generator that never produces text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGenerator;

impl AnswerGenerator for NullGenerator {
    fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, GenerateError> {
        Err(GenerateError::Disabled)
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Pick a generator from config. Without a resolvable API key (or with
/// `enabled = false`) this is the [`NullGenerator`].
pub fn create_generator(config: &LlmConfig) -> Box<dyn AnswerGenerator> {
    if !config.enabled {
        tracing::info!("language model disabled by config");
        return Box::new(NullGenerator);
    }
    match credentials::resolve_api_key(&config.env_files) {
        Some(api_key) => {
            tracing::info!(model = %config.model, base_url = %config.base_url, "language model enabled");
            Box::new(chat::ChatCompletionGenerator::new(config, api_key))
        }
        None => {
            tracing::info!("no DEEPSEEK_API_KEY found, answering from the knowledge base only");
            Box::new(NullGenerator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_generator_is_disabled() {
        let req = GenerationRequest {
            system: "s",
            question: "q",
            context: "c",
        };
        assert!(matches!(NullGenerator.generate(&req), Err(GenerateError::Disabled)));
    }

    #[test]
    fn disabled_config_selects_null_generator() {
        let config = LlmConfig {
            enabled: false,
            ..LlmConfig::default()
        };
        assert_eq!(create_generator(&config).name(), "none");
    }

    #[test]
    fn user_message_embeds_question_and_context() {
        let req = GenerationRequest {
            system: "sys",
            question: "几点开门",
            context: "九点",
        };
        let msg = req.user_message();
        assert!(msg.starts_with("问题：几点开门\n"));
        assert!(msg.contains("知识库参考答案：九点"));
    }
}
