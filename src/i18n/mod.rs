//! Internationalization (i18n) core.
//!
//! # Architecture
//!
//! - `registry`: the supported languages and their URL codes
//! - `language`: the closed `Language` enum
//! - `paths`: adding, removing and detecting language prefixes on paths
//! - `store`: the observable current language
//! - `cache`: coalescing translation cache in front of a `Translator`
//! - `metrics`: cache and backend counters
//!
//! # Example
//!
//! ```rust,ignore
//! use site_localizer::i18n::{localize, Language, LanguageStore};
//!
//! let store = LanguageStore::new(Language::Spanish);
//! assert_eq!(localize("bmi-calculator", store.get()), "/es/bmi-calculator");
//! ```

mod cache;
mod language;
mod metrics;
mod paths;
mod registry;
mod store;

pub use cache::TranslationCache;
pub use language::{Language, ParseLanguageError};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use paths::{
    delocalize, detect_language, is_exempt, is_localized, language_alternates, localize,
    RESERVED_PREFIXES,
};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use store::{LanguageStore, Subscription};
