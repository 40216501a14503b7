//! Path localization: adding, removing and detecting the language prefix.
//!
//! Paths for the default language carry no prefix (`/pricing`); every other
//! language is addressed as `/{code}/...` (`/es/pricing`). Paths under the
//! reserved segments `api/`, `_next/` and `auth/` are never touched.

use crate::i18n::{Language, LanguageRegistry};
use regex::Regex;
use std::sync::OnceLock;

/// Leading segments that are served outside the localized page tree.
pub const RESERVED_PREFIXES: [&str; 3] = ["api/", "_next/", "auth/"];

static LOCALIZED_REGEX: OnceLock<Regex> = OnceLock::new();

fn localized_regex() -> &'static Regex {
    LOCALIZED_REGEX.get_or_init(|| Regex::new(r"^/?[a-z]{2}(/|$)").expect("valid regex"))
}

fn relative(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Whether the path lives under a reserved segment.
pub fn is_exempt(path: &str) -> bool {
    let path = relative(path);
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Whether the path already starts with a two-letter language-like segment.
///
/// This is a shape check: `/xx/page` matches even though `xx` is not a
/// registered code.
pub fn is_localized(path: &str) -> bool {
    localized_regex().is_match(path)
}

/// Add the language prefix for `language` to `path`.
///
/// The default language yields the bare path. Re-localizing a path that
/// already carries the same prefix returns it unchanged.
pub fn localize(path: &str, language: Language) -> String {
    let path = relative(path);

    if is_exempt(path) || language.is_default() {
        return format!("/{}", path);
    }

    let code = language.code();
    let already_prefixed = path
        .strip_prefix(code)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));

    if already_prefixed {
        format!("/{}", path)
    } else if path.is_empty() {
        format!("/{}", code)
    } else {
        format!("/{}/{}", code, path)
    }
}

/// Remove a leading registered language code, returning an absolute path.
pub fn delocalize(path: &str) -> String {
    let path = relative(path);
    if is_exempt(path) {
        return format!("/{}", path);
    }

    let (first, rest) = split_first_segment(path);
    if LanguageRegistry::get().is_known_code(first) {
        format!("/{}", rest)
    } else {
        format!("/{}", path)
    }
}

/// Language named by the first path segment, or the default language.
pub fn detect_language(path: &str) -> Language {
    let (first, _) = split_first_segment(relative(path));
    Language::from_code(first)
}

/// Split `a/b/c` into (`a`, `b/c`) and `a` into (`a`, ``).
fn split_first_segment(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((first, rest)) => (first, rest),
        None => (path, ""),
    }
}

/// The same page addressed in every supported language.
pub fn language_alternates(path: &str) -> Vec<(Language, String)> {
    let base = delocalize(path);
    Language::ALL
        .into_iter()
        .map(|language| (language, localize(&base, language)))
        .collect()
}
