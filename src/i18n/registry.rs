//! Language registry: single source of truth for the supported languages.
//!
//! Holds the bidirectional mapping between [`Language`] values and their
//! two-letter URL codes. It is built once on first access and is immutable
//! thereafter.

use crate::i18n::Language;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Metadata for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub language: Language,

    /// Two lowercase letters used as the URL prefix (e.g., "es")
    pub code: &'static str,

    /// Stable identifier used in configuration (e.g., "spanish")
    pub identifier: &'static str,

    /// English name of the language (e.g., "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Español")
    pub native_name: &'static str,

    /// Whether this is the default language, which carries no URL prefix
    pub is_default: bool,
}

/// Global language registry.
pub struct LanguageRegistry {
    /// Indexed by `Language as usize`
    languages: Vec<LanguageConfig>,
    by_code: HashMap<&'static str, Language>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| {
            let languages = default_languages();
            let by_code = languages
                .iter()
                .map(|config| (config.code, config.language))
                .collect();
            LanguageRegistry { languages, by_code }
        })
    }

    /// Full metadata for a language.
    pub fn config(&self, language: Language) -> &LanguageConfig {
        &self.languages[language as usize]
    }

    /// URL code of a language (e.g., `Language::Spanish` -> "es").
    pub fn code_of(&self, language: Language) -> &'static str {
        self.config(language).code
    }

    /// Language for a URL code. Unknown codes resolve to the default language.
    pub fn language_of(&self, code: &str) -> Language {
        self.get_by_code(code)
            .map(|config| config.language)
            .unwrap_or(Language::DEFAULT)
    }

    /// Look up a language by URL code without falling back.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.by_code
            .get(code)
            .map(|language| self.config(*language))
    }

    /// Check whether a string is a recognized URL code.
    pub fn is_known_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// All languages in registry order (default first).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The default language configuration.
    pub fn default_language(&self) -> &LanguageConfig {
        self.config(Language::DEFAULT)
    }
}

/// Supported languages, in `Language` declaration order.
fn default_languages() -> Vec<LanguageConfig> {
    let table: [(Language, &str, &str, &str, &str); 13] = [
        (Language::English, "en", "english", "English", "English"),
        (Language::Spanish, "es", "spanish", "Spanish", "Español"),
        (Language::French, "fr", "french", "French", "Français"),
        (Language::German, "de", "german", "German", "Deutsch"),
        (Language::Italian, "it", "italian", "Italian", "Italiano"),
        (Language::Portuguese, "pt", "portuguese", "Portuguese", "Português"),
        (Language::Dutch, "nl", "dutch", "Dutch", "Nederlands"),
        (Language::Russian, "ru", "russian", "Russian", "Русский"),
        (Language::Chinese, "zh", "chinese", "Chinese", "中文"),
        (Language::Japanese, "ja", "japanese", "Japanese", "日本語"),
        (Language::Korean, "ko", "korean", "Korean", "한국어"),
        (Language::Arabic, "ar", "arabic", "Arabic", "العربية"),
        (Language::Hindi, "hi", "hindi", "Hindi", "हिन्दी"),
    ];

    table
        .into_iter()
        .map(
            |(language, code, identifier, name, native_name)| LanguageConfig {
                language,
                code,
                identifier,
                name,
                native_name,
                is_default: language == Language::DEFAULT,
            },
        )
        .collect()
}
