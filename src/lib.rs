//! Client-side localization core for a multi-language website.
//!
//! Keeps the current language, localizes internal paths and links to it, and
//! translates visible strings on demand through a coalescing cache.

pub mod config;
pub mod i18n;
pub mod navigation;
pub mod retry;
pub mod rich_text;
pub mod translation;
pub mod view;
