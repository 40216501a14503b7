use crate::i18n::Language;
use anyhow::{Context, Result};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation backend (OpenAI-compatible)
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub translation_max_tokens: u32,
    pub translation_max_attempts: u32,

    // Language the session starts in
    pub site_language: Language,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            translation_max_tokens: std::env::var("TRANSLATION_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            translation_max_attempts: std::env::var("TRANSLATION_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            site_language: site_language_from_env(),
        })
    }
}

/// `SITE_LANGUAGE`, for commands that need no translation backend.
pub fn site_language_from_env() -> Language {
    parse_site_language(std::env::var("SITE_LANGUAGE").ok().as_deref())
}

/// Starting language for the store: an explicit override wins over the
/// configured site language. An invalid override is an error.
pub fn initial_language(override_value: Option<&str>, configured: Language) -> Result<Language> {
    match override_value {
        None => Ok(configured),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid language argument '{}'", raw)),
    }
}

/// Unknown or missing values fall back to the default language.
fn parse_site_language(value: Option<&str>) -> Language {
    match value {
        None => Language::DEFAULT,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid SITE_LANGUAGE ({}), using {}", e, Language::DEFAULT);
            Language::DEFAULT
        }),
    }
}
