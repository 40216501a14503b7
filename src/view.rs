//! Text translation view: a literal string shown in the active language.
//!
//! The view keeps showing its previous value while a translation is pending,
//! so switching languages never blanks the text. A failed translation shows
//! the source string, never a leftover translation from another language.

use crate::i18n::{Language, LanguageStore, TranslationCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

struct ViewInner {
    source: String,
    store: LanguageStore,
    cache: TranslationCache,
    displayed: Mutex<String>,
    /// Bumped on every render request; only the newest may update `displayed`
    generation: AtomicU64,
}

/// Displayable translation of a literal source string.
#[derive(Clone)]
pub struct TranslatedText {
    inner: Arc<ViewInner>,
}

impl TranslatedText {
    pub fn new(source: impl Into<String>, store: LanguageStore, cache: TranslationCache) -> Self {
        let source = source.into();
        Self {
            inner: Arc::new(ViewInner {
                displayed: Mutex::new(source.clone()),
                source,
                store,
                cache,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// The value currently on screen.
    pub fn text(&self) -> String {
        self.inner
            .displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Render once for the language active right now.
    pub async fn refresh(&self) {
        self.render(self.inner.store.get()).await;
    }

    async fn render(&self, language: Language) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let value = if language.is_default() {
            self.inner.source.clone()
        } else {
            self.inner.cache.translate(&self.inner.source, language).await
        };

        // A newer render started while this one was waiting.
        if self.inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        *self
            .inner
            .displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// React to language changes on a background task until the handle is
    /// dropped. A change abandons the previous render; the cache fill it
    /// started keeps running for other callers.
    pub fn spawn(&self) -> ViewHandle {
        let view = self.clone();
        let mut changes = self.inner.store.watch();

        let task = tokio::spawn(async move {
            loop {
                let language = *changes.borrow_and_update();
                let rendered = tokio::select! {
                    _ = view.render(language) => true,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        false
                    }
                };
                if rendered && changes.changed().await.is_err() {
                    break;
                }
            }
        });

        ViewHandle { task }
    }
}

/// Owns the reaction task of a spawned [`TranslatedText`].
#[must_use = "dropping this handle tears the view down"]
pub struct ViewHandle {
    task: JoinHandle<()>,
}

impl ViewHandle {
    pub fn teardown(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
