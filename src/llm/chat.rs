//! OpenAI-compatible chat-completion client (DeepSeek by default).
//!
//! Sends `{model, messages, temperature, max_tokens}` to `{base_url}/chat/completions`
//! with a bearer token and reads `choices[0].message.content`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{AnswerGenerator, GenerateError, GenerationRequest};
use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking chat-completion generator with a bounded request timeout.
#[derive(Debug, Clone)]
pub struct ChatCompletionGenerator {
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
}

impl ChatCompletionGenerator {
    pub fn new(config: &LlmConfig, api_key: String) -> Self {
        Self {
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnswerGenerator for ChatCompletionGenerator {
    fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerateError> {
        let user = request.user_message();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system.trim(),
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        // A short-lived client per call keeps this usable from any blocking thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let response = client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Status(status.as_u16()));
        }

        let bytes = response.bytes()?;
        extract_content(&String::from_utf8_lossy(&bytes))
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Pull `choices[0].message.content` out of a response body.
fn extract_content(body: &str) -> Result<String, GenerateError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::Malformed(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| GenerateError::Malformed("missing choices[0].message.content".into()))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(GenerateError::Empty);
    }
    Ok(content.to_string())
}
