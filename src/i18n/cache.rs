//! Translation cache with request coalescing.
//!
//! Entries are keyed by (source text, target language). A key is either
//! resolved or has exactly one in-flight backend call; every concurrent caller
//! for that key awaits the same shared handle. The backend call runs on its
//! own task, so callers that stop waiting never cancel the fill.
//!
//! Failed calls, including a translator that panics, leave no entry behind,
//! so a later request may try again.
//! Resolved entries live for the lifetime of the cache.

use crate::i18n::{Language, MetricsReport, TranslationMetrics};
use crate::translation::Translator;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

type CacheKey = (String, Language);

/// Shared handle to an in-flight translation. `None` means the call failed.
type PendingTranslation = Shared<BoxFuture<'static, Option<String>>>;

enum CacheEntry {
    Resolved(String),
    Pending(PendingTranslation),
}

type Entries = Arc<Mutex<HashMap<CacheKey, CacheEntry>>>;

/// Process-wide translation cache in front of a [`Translator`].
///
/// Cloning yields another handle to the same entries and metrics.
#[derive(Clone)]
pub struct TranslationCache {
    translator: Arc<dyn Translator>,
    entries: Entries,
    metrics: Arc<TranslationMetrics>,
}

impl TranslationCache {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            entries: Arc::new(Mutex::new(HashMap::new())),
            metrics: Arc::new(TranslationMetrics::new()),
        }
    }

    /// Translate `text` into `language`.
    ///
    /// Never fails: if the backend call fails the source text is returned.
    /// The default language is answered immediately without touching the
    /// cache or the backend. Must be called from within a tokio runtime.
    pub async fn translate(&self, text: &str, language: Language) -> String {
        self.translate_outcome(text, language)
            .await
            .unwrap_or_else(|| text.to_string())
    }

    /// Like [`translate`](Self::translate) but reports a failed backend call as `None`.
    pub async fn translate_outcome(&self, text: &str, language: Language) -> Option<String> {
        if language.is_default() {
            return Some(text.to_string());
        }

        let key = (text.to_string(), language);
        let pending = {
            let mut entries = lock(&self.entries);
            match entries.get(&key) {
                Some(CacheEntry::Resolved(translated)) => {
                    self.metrics.record_cache_hit();
                    debug!("Translation cache hit ({})", language.code());
                    return Some(translated.clone());
                }
                Some(CacheEntry::Pending(pending)) => {
                    self.metrics.record_coalesced_wait();
                    debug!("Joining in-flight translation ({})", language.code());
                    pending.clone()
                }
                None => {
                    self.metrics.record_cache_miss();
                    let pending = self.start_fill(key.clone());
                    entries.insert(key, CacheEntry::Pending(pending.clone()));
                    pending
                }
            }
        };

        pending.await
    }

    /// Spawn the backend call for `key`. The caller must insert the returned
    /// handle while still holding the entries lock.
    fn start_fill(&self, key: CacheKey) -> PendingTranslation {
        let translator = Arc::clone(&self.translator);
        let entries = Arc::clone(&self.entries);
        let metrics = Arc::clone(&self.metrics);

        let fill = tokio::spawn(async move {
            metrics.record_backend_call();
            let language = key.1;
            let outcome = AssertUnwindSafe(translator.translate_text(&key.0, language))
                .catch_unwind()
                .await;

            let mut entries = lock(&entries);
            match outcome {
                Ok(Ok(translated)) => {
                    entries.insert(key, CacheEntry::Resolved(translated.clone()));
                    Some(translated)
                }
                Ok(Err(e)) => {
                    metrics.record_backend_failure();
                    warn!(
                        "Translation to {} failed, showing source text: {}",
                        language.name(),
                        e
                    );
                    entries.remove(&key);
                    None
                }
                Err(_) => {
                    metrics.record_backend_failure();
                    warn!(
                        "Translator panicked translating to {}, showing source text",
                        language.name()
                    );
                    entries.remove(&key);
                    None
                }
            }
        });

        fill.map(|joined| joined.ok().flatten()).boxed().shared()
    }

    /// Resolved translation for a key, without fetching.
    pub fn cached(&self, text: &str, language: Language) -> Option<String> {
        if language.is_default() {
            return Some(text.to_string());
        }
        match lock(&self.entries).get(&(text.to_string(), language)) {
            Some(CacheEntry::Resolved(translated)) => Some(translated.clone()),
            _ => None,
        }
    }

    /// Warm the cache for many strings at once; duplicates coalesce.
    pub async fn prefetch<I, S>(&self, texts: I, language: Language)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let texts: Vec<S> = texts.into_iter().collect();
        join_all(
            texts
                .iter()
                .map(|text| self.translate_outcome(text.as_ref(), language)),
        )
        .await;
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        lock(&self.entries)
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Resolved(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys with a backend call in flight.
    pub fn pending_count(&self) -> usize {
        lock(&self.entries)
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Pending(_)))
            .count()
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn report(&self) -> MetricsReport {
        self.metrics.report()
    }
}

fn lock(
    entries: &Mutex<HashMap<CacheKey, CacheEntry>>,
) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
