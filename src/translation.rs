use crate::config::Config;
use crate::i18n::Language;
use crate::retry::{RetryConfig, Retryable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single translation attempt.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to reach translation service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("translation service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse translation response: {0}")]
    Decode(reqwest::Error),

    #[error("translation response contained no choices")]
    EmptyResponse,
}

/// Rate limits, server errors and transport failures are worth retrying;
/// other client errors and malformed responses are not.
impl Retryable for TranslateError {
    fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Transport(_) => true,
            TranslateError::Api { status, .. } => *status == 429 || *status >= 500,
            TranslateError::Decode(_) | TranslateError::EmptyResponse => false,
        }
    }
}

/// The external "translate text" capability.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_text(&self, text: &str, target: Language) -> Result<String, TranslateError>;
}

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

fn build_translation_system_prompt(target: Language) -> String {
    format!(
        r#"You translate short user interface strings of a calculator website from English to {} ({}).

## Rules
- Reply with the translation only: no quotes, notes or explanations
- Keep numbers, units, currency symbols and formulas exactly as written
- Keep placeholders such as {{value}} or %s untouched
- Keep inline markup (**bold**, *italic*, [label](link)) and translate only the visible words
- If a term has no good translation, keep the English term"#,
        target.name(),
        target.native_name()
    )
}

/// Translator backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    max_tokens: u32,
    retry: RetryConfig,
}

impl OpenAiTranslator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            api_url: config.openai_api_url.clone(),
            max_tokens: config.translation_max_tokens,
            retry: RetryConfig::translation_with_attempts(config.translation_max_attempts),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn build_request(&self, text: &str, target: Language) -> TranslationRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_translation_system_prompt(target),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_completion_tokens: if is_reasoning { 4000 } else { self.max_tokens },
            temperature: if is_reasoning { None } else { Some(0.2) },
            reasoning_effort: is_reasoning.then(|| "low".to_string()),
        }
    }

    async fn send_once(&self, request: &TranslationRequest) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslateError::Api { status, body });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(TranslateError::Decode)?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(TranslateError::EmptyResponse)
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate_text(&self, text: &str, target: Language) -> Result<String, TranslateError> {
        if target.is_default() {
            return Ok(text.to_string());
        }

        let request = self.build_request(text, target);

        self.retry
            .run(&format!("Translation to {}", target.name()), || {
                self.send_once(&request)
            })
            .await
    }
}
