//! Localize links or translate strings from the command line.
//!
//! Usage:
//!   site-localizer localize [--language <language>] <href>...
//!   site-localizer translate [--language <language>] <text>...
//!
//! Without `--language` the session starts in `SITE_LANGUAGE`.
//! `translate` needs OPENAI_API_KEY (see `Config::from_env`).

use anyhow::{bail, Result};
use site_localizer::config::{initial_language, site_language_from_env, Config};
use site_localizer::i18n::{LanguageStore, TranslationCache};
use site_localizer::navigation::{LinkActivation, NavigationDecision, NavigationInterceptor};
use site_localizer::translation::OpenAiTranslator;
use std::sync::Arc;
use tracing::info;

const USAGE: &str = "usage: site-localizer <localize|translate> [--language <language>] <item>...";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_localizer=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        bail!(USAGE);
    };
    let (language_flag, items) = match rest {
        [flag, language, items @ ..] if flag == "--language" || flag == "-l" => {
            (Some(language.as_str()), items)
        }
        items => (None, items),
    };
    if items.is_empty() {
        bail!(USAGE);
    }

    match command.as_str() {
        "localize" => {
            let store = LanguageStore::new(initial_language(language_flag, site_language_from_env())?);
            localize(&store, items)
        }
        "translate" => {
            let config = Config::from_env()?;
            let store = LanguageStore::new(initial_language(language_flag, config.site_language)?);
            translate(&config, &store, items).await
        }
        other => bail!("unknown command '{}'", other),
    }
}

fn localize(store: &LanguageStore, hrefs: &[String]) -> Result<()> {
    let interceptor = NavigationInterceptor::new(store.clone());

    for href in hrefs {
        match interceptor.intercept(&LinkActivation::click(href.as_str())) {
            NavigationDecision::Rewrite { target } => println!("{} -> {}", href, target),
            NavigationDecision::PassThrough => println!("{} (unchanged)", href),
        }
    }
    Ok(())
}

async fn translate(config: &Config, store: &LanguageStore, texts: &[String]) -> Result<()> {
    let translator = OpenAiTranslator::new(reqwest::Client::new(), config);
    let cache = TranslationCache::new(Arc::new(translator));
    let language = store.get();

    info!("Translating {} strings to {}", texts.len(), language.name());
    cache.prefetch(texts, language).await;

    for text in texts {
        println!("{} => {}", text, cache.translate(text, language).await);
    }

    println!("{}", serde_json::to_string_pretty(&cache.report())?);
    Ok(())
}
