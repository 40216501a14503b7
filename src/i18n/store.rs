//! Language state store: the currently active language.
//!
//! A [`LanguageStore`] is an explicit handle passed to every component that
//! needs locale context. Clones share the same state. `set` updates the value
//! and runs every subscriber before it returns, so a `get` issued after `set`
//! never observes the previous language.

use crate::i18n::Language;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;
use tracing::{debug, info};

type Callback = Arc<dyn Fn(Language) + Send + Sync>;

struct StoreInner {
    current: watch::Sender<Language>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

/// Shared, observable current language.
#[derive(Clone)]
pub struct LanguageStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for LanguageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageStore")
            .field("current", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl LanguageStore {
    pub fn new(initial: Language) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            inner: Arc::new(StoreInner {
                current,
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn get(&self) -> Language {
        *self.inner.current.borrow()
    }

    /// Switch the active language.
    ///
    /// Returns `false` (and notifies nobody) when `language` is already active.
    pub fn set(&self, language: Language) -> bool {
        let changed = self.inner.current.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });

        if !changed {
            debug!("Language already set to {}, skipping notification", language);
            return false;
        }

        info!("Language switched to {} ({})", language, language.code());

        // Snapshot so callbacks may subscribe, unsubscribe or set re-entrantly.
        let callbacks: Vec<Callback> = self
            .lock_subscribers()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            // A nested set already notified everyone of the newer value.
            if self.get() != language {
                break;
            }
            callback(language);
        }

        true
    }

    /// Register a callback invoked with the new language after every change.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(Language) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_subscribers().push((id, Arc::new(callback)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Async view of the current language for tasks that await changes.
    pub fn watch(&self) -> watch::Receiver<Language> {
        self.inner.current.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Callback)>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LanguageStore {
    fn default() -> Self {
        Self::new(Language::DEFAULT)
    }
}

/// Guard for a store subscription. Dropping it removes the callback.
#[must_use = "dropping this guard unsubscribes the callback"]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_new_store_returns_initial() {
        let store = LanguageStore::new(Language::French);
        assert_eq!(store.get(), Language::French);
        assert_eq!(LanguageStore::default().get(), Language::English);
    }

    #[test]
    fn test_set_updates_value() {
        let store = LanguageStore::default();
        assert!(store.set(Language::Spanish));
        assert_eq!(store.get(), Language::Spanish);
    }

    #[test]
    fn test_set_same_language_is_noop() {
        let store = LanguageStore::new(Language::Spanish);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _subscription = store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!store.set(Language::Spanish));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscribers_notified_before_set_returns() {
        let store = LanguageStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _subscription = store.subscribe(move |language| {
            seen_clone.lock().unwrap().push(language);
        });

        store.set(Language::German);
        store.set(Language::Korean);

        assert_eq!(*seen.lock().unwrap(), vec![Language::German, Language::Korean]);
    }

    #[test]
    fn test_subscriber_reads_new_value_from_store() {
        let store = LanguageStore::default();
        let observed = Arc::new(Mutex::new(None));
        let observed_clone = observed.clone();
        let store_clone = store.clone();
        let _subscription = store.subscribe(move |_| {
            *observed_clone.lock().unwrap() = Some(store_clone.get());
        });

        store.set(Language::Italian);
        assert_eq!(*observed.lock().unwrap(), Some(Language::Italian));
    }

    #[test]
    fn test_nested_set_leaves_every_subscriber_on_newest() {
        let store = LanguageStore::default();
        let redirecting_store = store.clone();
        let _redirect = store.subscribe(move |language| {
            if language == Language::Spanish {
                redirecting_store.set(Language::French);
            }
        });
        let last_seen = Arc::new(Mutex::new(Vec::new()));
        let last_seen_clone = last_seen.clone();
        let _recorder = store.subscribe(move |language| {
            last_seen_clone.lock().unwrap().push(language);
        });

        store.set(Language::Spanish);

        assert_eq!(store.get(), Language::French);
        assert_eq!(*last_seen.lock().unwrap(), vec![Language::French]);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let store = LanguageStore::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let subscription = store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.subscriber_count(), 1);

        store.set(Language::Dutch);
        subscription.unsubscribe();
        store.set(Language::Hindi);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let store = LanguageStore::default();
        let other = store.clone();
        other.set(Language::Arabic);
        assert_eq!(store.get(), Language::Arabic);
    }

    #[test]
    fn test_stores_are_isolated() {
        let first = LanguageStore::default();
        let second = LanguageStore::default();
        first.set(Language::Russian);
        assert_eq!(second.get(), Language::English);
    }

    #[tokio::test]
    async fn test_watch_receiver_sees_changes() {
        let store = LanguageStore::default();
        let mut receiver = store.watch();

        store.set(Language::Chinese);
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), Language::Chinese);
    }
}
