//! Language type: the closed set of supported languages.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A supported language.
///
/// Every variant has exactly one URL code in the [`LanguageRegistry`]. The
/// default language is addressed by the absence of a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Dutch,
    Russian,
    Chinese,
    Japanese,
    Korean,
    Arabic,
    Hindi,
}

/// Returned when a string names neither a language identifier nor a URL code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language: '{0}'")]
pub struct ParseLanguageError(pub String);

impl Language {
    /// The language served without a URL prefix and never sent for translation.
    pub const DEFAULT: Language = Language::English;

    pub const ALL: [Language; 13] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Dutch,
        Language::Russian,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
        Language::Arabic,
        Language::Hindi,
    ];

    /// Resolve a URL code. Unknown codes resolve to [`Language::DEFAULT`].
    pub fn from_code(code: &str) -> Language {
        LanguageRegistry::get().language_of(code)
    }

    /// Two-letter URL code (e.g., "es").
    pub fn code(self) -> &'static str {
        LanguageRegistry::get().code_of(self)
    }

    /// Configuration identifier (e.g., "spanish").
    pub fn identifier(self) -> &'static str {
        self.config().identifier
    }

    pub fn config(self) -> &'static LanguageConfig {
        LanguageRegistry::get().config(self)
    }

    /// English name (e.g., "Spanish").
    pub fn name(self) -> &'static str {
        self.config().name
    }

    /// Native name (e.g., "Español").
    pub fn native_name(self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(self) -> bool {
        self == Language::DEFAULT
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::DEFAULT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Parses either an identifier ("spanish") or a URL code ("es"), ignoring case.
impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        let registry = LanguageRegistry::get();

        if let Some(config) = registry.get_by_code(&needle) {
            return Ok(config.language);
        }

        registry
            .list_all()
            .into_iter()
            .find(|config| config.identifier == needle)
            .map(|config| config.language)
            .ok_or_else(|| ParseLanguageError(s.to_string()))
    }
}
