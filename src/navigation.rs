//! Navigation interception: rewriting internal links to the active language.
//!
//! Every navigation intent (a link activation or a programmatic push) is
//! classified first. Only internal destinations without a language prefix are
//! rewritten; everything else passes through untouched so the default
//! behaviour (external sites, fragments, API downloads) still happens.

use crate::i18n::{delocalize, is_exempt, is_localized, localize, Language, LanguageStore};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Href prefixes served outside the page router.
const RESERVED_HREF_PREFIXES: [&str; 3] = ["/api", "/_next", "/auth"];

static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();

fn scheme_regex() -> &'static Regex {
    SCHEME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("valid regex"))
}

/// What a navigation target points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Absolute URL, protocol-relative URL, `mailto:`, `tel:` or any other scheme
    External,
    /// `#section`, `?query`, or an empty href (same document)
    Fragment,
    /// Under `/api`, `/_next` or `/auth`
    Reserved,
    /// Already starts with a two-letter language segment
    Localized,
    /// Internal page path that still needs a language prefix
    InternalRaw,
}

pub fn classify(href: &str) -> Destination {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') || href.starts_with('?') {
        Destination::Fragment
    } else if href.starts_with("http")
        || href.starts_with("//")
        || scheme_regex().is_match(href)
    {
        Destination::External
    } else if RESERVED_HREF_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
        // relative `api/...` style hrefs have no leading slash
        || is_exempt(split_suffix(href).0)
    {
        Destination::Reserved
    } else if is_localized(split_suffix(href).0) {
        Destination::Localized
    } else {
        Destination::InternalRaw
    }
}

/// Split `/path?query#hash` into (`/path`, `?query#hash`).
fn split_suffix(href: &str) -> (&str, &str) {
    match href.find(['?', '#']) {
        Some(index) => href.split_at(index),
        None => (href, ""),
    }
}

/// Localize an internal-raw href for `language`, keeping query and fragment.
///
/// Returns `None` for every other kind of destination.
pub fn rewrite(href: &str, language: Language) -> Option<String> {
    if classify(href) != Destination::InternalRaw {
        return None;
    }
    let (path, suffix) = split_suffix(href.trim());
    Some(format!("{}{}", localize(path, language), suffix))
}

/// A link activation as seen by the page before default routing runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkActivation {
    pub href: String,
    /// Mouse button; 0 is the primary button
    pub button: u16,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    /// The anchor's `target` attribute
    pub target: Option<String>,
    /// Whether the anchor carries a `download` attribute
    pub download: bool,
}

impl LinkActivation {
    /// Plain primary-button click on `href`.
    pub fn click(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// Activations the browser handles itself (new tab, new window, download).
    fn is_modified(&self) -> bool {
        self.button != 0
            || self.ctrl_key
            || self.meta_key
            || self.shift_key
            || self.alt_key
            || self.download
            || self
                .target
                .as_deref()
                .is_some_and(|target| !target.is_empty() && target != "_self")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the default navigation proceed unmodified.
    PassThrough,
    /// Suppress the default navigation and go to `target` instead.
    Rewrite { target: String },
}

impl NavigationDecision {
    pub fn target(&self) -> Option<&str> {
        match self {
            NavigationDecision::PassThrough => None,
            NavigationDecision::Rewrite { target } => Some(target),
        }
    }

    pub fn suppresses_default(&self) -> bool {
        matches!(self, NavigationDecision::Rewrite { .. })
    }
}

/// Navigation-request middleware bound to a language store.
///
/// The store is read at decision time, never cached, so a link activated
/// right after a language switch uses the new language.
#[derive(Debug, Clone)]
pub struct NavigationInterceptor {
    store: LanguageStore,
}

impl NavigationInterceptor {
    pub fn new(store: LanguageStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LanguageStore {
        &self.store
    }

    pub fn intercept(&self, activation: &LinkActivation) -> NavigationDecision {
        if activation.is_modified() {
            debug!("Passing through modified activation of {}", activation.href);
            return NavigationDecision::PassThrough;
        }

        let language = self.store.get();
        match rewrite(&activation.href, language) {
            Some(target) if target != activation.href => {
                debug!("Rewriting {} -> {}", activation.href, target);
                NavigationDecision::Rewrite { target }
            }
            _ => {
                debug!(
                    "Passing through {} ({:?})",
                    activation.href,
                    classify(&activation.href)
                );
                NavigationDecision::PassThrough
            }
        }
    }

    /// Destination for a programmatic navigation to `href`.
    pub fn resolve(&self, href: &str) -> String {
        rewrite(href, self.store.get()).unwrap_or_else(|| href.to_string())
    }
}

/// The external routing capability.
pub trait Router {
    fn push(&self, href: &str);
    fn replace(&self, href: &str);
    fn prefetch(&self, href: &str);
}

/// Router wrapper that localizes every destination before delegating.
pub struct LocalizedRouter<R: Router> {
    router: R,
    interceptor: NavigationInterceptor,
}

impl<R: Router> LocalizedRouter<R> {
    pub fn new(router: R, store: LanguageStore) -> Self {
        Self {
            router,
            interceptor: NavigationInterceptor::new(store),
        }
    }

    pub fn inner(&self) -> &R {
        &self.router
    }

    pub fn interceptor(&self) -> &NavigationInterceptor {
        &self.interceptor
    }

    pub fn push(&self, href: &str) {
        let target = self.interceptor.resolve(href);
        debug!("push {}", target);
        self.router.push(&target);
    }

    pub fn replace(&self, href: &str) {
        let target = self.interceptor.resolve(href);
        debug!("replace {}", target);
        self.router.replace(&target);
    }

    pub fn prefetch(&self, href: &str) {
        self.router.prefetch(&self.interceptor.resolve(href));
    }

    /// Run a link activation through the interceptor and, when rewritten,
    /// navigate to the localized target. The caller suppresses the default
    /// action when the returned decision says so.
    pub fn handle_click(&self, activation: &LinkActivation) -> NavigationDecision {
        let decision = self.interceptor.intercept(activation);
        if let NavigationDecision::Rewrite { target } = &decision {
            self.router.push(target);
        }
        decision
    }

    /// Switch the active language and move the current page to it.
    ///
    /// Returns the path navigated to.
    pub fn switch_language(&self, language: Language, current_href: &str) -> String {
        self.interceptor.store().set(language);

        let (path, suffix) = split_suffix(current_href.trim());
        let target = format!("{}{}", localize(&delocalize(path), language), suffix);
        info!("Switching page to {}: {}", language, target);
        self.router.replace(&target);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRouter {
        calls: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingRouter {
        fn calls(&self) -> Vec<(&'static str, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Router for RecordingRouter {
        fn push(&self, href: &str) {
            self.calls.lock().unwrap().push(("push", href.to_string()));
        }

        fn replace(&self, href: &str) {
            self.calls.lock().unwrap().push(("replace", href.to_string()));
        }

        fn prefetch(&self, href: &str) {
            self.calls.lock().unwrap().push(("prefetch", href.to_string()));
        }
    }

    // ==================== classify Tests ====================

    #[test]
    fn test_classify_external() {
        assert_eq!(classify("https://example.com"), Destination::External);
        assert_eq!(classify("http://example.com/es"), Destination::External);
        assert_eq!(classify("//cdn.example.com/a.js"), Destination::External);
        assert_eq!(classify("mailto:hi@example.com"), Destination::External);
        assert_eq!(classify("tel:+123"), Destination::External);
        assert_eq!(classify("javascript:void(0)"), Destination::External);
    }

    #[test]
    fn test_classify_fragment() {
        assert_eq!(classify("#section"), Destination::Fragment);
        assert_eq!(classify(""), Destination::Fragment);
        assert_eq!(classify("?page=2"), Destination::Fragment);
        assert_eq!(classify("?page=2#results"), Destination::Fragment);
    }

    #[test]
    fn test_classify_relative_reserved_path() {
        assert_eq!(classify("api/backup"), Destination::Reserved);
        assert_eq!(classify("_next/data.json?v=1"), Destination::Reserved);
    }

    #[test]
    fn test_classify_reserved() {
        assert_eq!(classify("/api/backup"), Destination::Reserved);
        assert_eq!(classify("/_next/static/chunk.js"), Destination::Reserved);
        assert_eq!(classify("/auth/login"), Destination::Reserved);
        assert_eq!(classify("/apiary"), Destination::Reserved);
    }

    #[test]
    fn test_classify_localized() {
        assert_eq!(classify("/es"), Destination::Localized);
        assert_eq!(classify("/es/bmi"), Destination::Localized);
        assert_eq!(classify("/fr?x=1"), Destination::Localized);
    }

    #[test]
    fn test_classify_internal_raw() {
        assert_eq!(classify("/"), Destination::InternalRaw);
        assert_eq!(classify("/bmi-calculator"), Destination::InternalRaw);
        assert_eq!(classify("/essay"), Destination::InternalRaw);
        assert_eq!(classify("loan/calculator"), Destination::InternalRaw);
    }

    // ==================== rewrite Tests ====================

    #[test]
    fn test_rewrite_preserves_query_and_fragment() {
        assert_eq!(
            rewrite("/pricing?x=1#a", Language::Spanish).as_deref(),
            Some("/es/pricing?x=1#a")
        );
        assert_eq!(rewrite("/?ref=nav", Language::German).as_deref(), Some("/de?ref=nav"));
    }

    #[test]
    fn test_rewrite_skips_non_internal() {
        assert_eq!(rewrite("https://example.com", Language::Spanish), None);
        assert_eq!(rewrite("#top", Language::Spanish), None);
        assert_eq!(rewrite("/api/backup", Language::Spanish), None);
        assert_eq!(rewrite("/fr/page", Language::Spanish), None);
        assert_eq!(rewrite("?page=2", Language::Spanish), None);
    }

    // ==================== Interceptor Tests ====================

    #[test]
    fn test_intercept_rewrites_internal_links() {
        let interceptor = NavigationInterceptor::new(LanguageStore::new(Language::Spanish));
        let decision = interceptor.intercept(&LinkActivation::click("/bmi-calculator"));

        assert_eq!(
            decision,
            NavigationDecision::Rewrite {
                target: "/es/bmi-calculator".to_string()
            }
        );
        assert!(decision.suppresses_default());
    }

    #[test]
    fn test_intercept_never_touches_external_fragment_or_api() {
        let interceptor = NavigationInterceptor::new(LanguageStore::new(Language::Spanish));
        for href in ["https://example.com", "#section", "/api/backup"] {
            let decision = interceptor.intercept(&LinkActivation::click(href));
            assert_eq!(decision, NavigationDecision::PassThrough, "{}", href);
            assert!(!decision.suppresses_default());
        }
    }

    #[test]
    fn test_intercept_default_language_passes_through_absolute_paths() {
        let interceptor = NavigationInterceptor::new(LanguageStore::default());
        assert_eq!(
            interceptor.intercept(&LinkActivation::click("/bmi-calculator")),
            NavigationDecision::PassThrough
        );
    }

    #[test]
    fn test_intercept_query_only_link_stays_on_page() {
        for language in [Language::English, Language::Spanish] {
            let interceptor = NavigationInterceptor::new(LanguageStore::new(language));
            assert_eq!(
                interceptor.intercept(&LinkActivation::click("?page=2")),
                NavigationDecision::PassThrough,
                "{}",
                language
            );
        }
    }

    #[test]
    fn test_intercept_modified_clicks_pass_through() {
        let interceptor = NavigationInterceptor::new(LanguageStore::new(Language::French));

        let ctrl = LinkActivation {
            ctrl_key: true,
            ..LinkActivation::click("/bmi")
        };
        let new_tab = LinkActivation {
            target: Some("_blank".to_string()),
            ..LinkActivation::click("/bmi")
        };
        let middle = LinkActivation {
            button: 1,
            ..LinkActivation::click("/bmi")
        };
        let same_frame = LinkActivation {
            target: Some("_self".to_string()),
            ..LinkActivation::click("/bmi")
        };

        assert_eq!(interceptor.intercept(&ctrl), NavigationDecision::PassThrough);
        assert_eq!(interceptor.intercept(&new_tab), NavigationDecision::PassThrough);
        assert_eq!(interceptor.intercept(&middle), NavigationDecision::PassThrough);
        assert!(interceptor.intercept(&same_frame).suppresses_default());
    }

    #[test]
    fn test_intercept_reads_language_at_decision_time() {
        let store = LanguageStore::new(Language::Spanish);
        let interceptor = NavigationInterceptor::new(store.clone());

        store.set(Language::Japanese);
        let decision = interceptor.intercept(&LinkActivation::click("/bmi"));

        assert_eq!(decision.target(), Some("/ja/bmi"));
    }

    // ==================== LocalizedRouter Tests ====================

    #[test]
    fn test_router_push_replace_prefetch_localize() {
        let router = LocalizedRouter::new(
            RecordingRouter::default(),
            LanguageStore::new(Language::Italian),
        );

        router.push("/mortgage");
        router.replace("/loan?amount=5");
        router.prefetch("/tip");
        router.push("https://example.com");

        assert_eq!(
            router.inner().calls(),
            vec![
                ("push", "/it/mortgage".to_string()),
                ("replace", "/it/loan?amount=5".to_string()),
                ("prefetch", "/it/tip".to_string()),
                ("push", "https://example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_handle_click_pushes_only_rewrites() {
        let router = LocalizedRouter::new(
            RecordingRouter::default(),
            LanguageStore::new(Language::Korean),
        );

        assert!(router.handle_click(&LinkActivation::click("/age")).suppresses_default());
        assert!(!router
            .handle_click(&LinkActivation::click("/api/backup"))
            .suppresses_default());

        assert_eq!(router.inner().calls(), vec![("push", "/ko/age".to_string())]);
    }

    #[test]
    fn test_switch_language_moves_current_page() {
        let store = LanguageStore::new(Language::Spanish);
        let router = LocalizedRouter::new(RecordingRouter::default(), store.clone());

        let target = router.switch_language(Language::German, "/es/bmi?unit=kg");
        assert_eq!(target, "/de/bmi?unit=kg");
        assert_eq!(store.get(), Language::German);

        let target = router.switch_language(Language::English, "/de/bmi");
        assert_eq!(target, "/bmi");

        assert_eq!(
            router.inner().calls(),
            vec![
                ("replace", "/de/bmi?unit=kg".to_string()),
                ("replace", "/bmi".to_string()),
            ]
        );
    }
}
