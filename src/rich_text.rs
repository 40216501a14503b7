//! Rich text rendering for translated strings.
//!
//! Supports a small inline markup: `**bold**`, `*italic*` and
//! `[label](href)`. Internal link targets are localized for the given
//! language. Input that does not parse renders as escaped plain text.

use crate::i18n::Language;
use crate::navigation::rewrite;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unclosed '{marker}' opened at byte {position}")]
    UnclosedEmphasis {
        marker: &'static str,
        position: usize,
    },

    #[error("malformed link at byte {position}")]
    MalformedLink { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn marker(self) -> &'static str {
        match self {
            Emphasis::Bold => "**",
            Emphasis::Italic => "*",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Emphasis::Bold => "strong",
            Emphasis::Italic => "em",
        }
    }
}

static LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn link_regex() -> &'static Regex {
    LINK_REGEX.get_or_init(|| Regex::new(r"^\[([^\]\[]+)\]\(([^)\s]+)\)").expect("valid regex"))
}

/// Render markup to HTML, falling back to escaped plain text when the input
/// is malformed. Never fails.
pub fn render_rich_text(input: &str, language: Language) -> String {
    match try_render_rich_text(input, language) {
        Ok(html) => html,
        Err(e) => {
            warn!("Rendering rich text as plain text: {}", e);
            escape_html(input)
        }
    }
}

/// Render markup to HTML, reporting malformed input.
pub fn try_render_rich_text(input: &str, language: Language) -> Result<String, RenderError> {
    let mut html = String::with_capacity(input.len() * 2);
    let mut open: Vec<(Emphasis, usize)> = Vec::new();
    let mut index = 0;

    while index < input.len() {
        let rest = &input[index..];

        if rest.starts_with("**") {
            toggle(&mut html, &mut open, Emphasis::Bold, index)?;
            index += 2;
        } else if rest.starts_with('*') {
            toggle(&mut html, &mut open, Emphasis::Italic, index)?;
            index += 1;
        } else if rest.starts_with('[') {
            let captures = link_regex()
                .captures(rest)
                .ok_or(RenderError::MalformedLink { position: index })?;
            let label = &captures[1];
            let href = &captures[2];
            let href = rewrite(href, language).unwrap_or_else(|| href.to_string());

            html.push_str(&format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(&href),
                escape_html(label)
            ));
            index += captures[0].len();
        } else {
            let Some(c) = rest.chars().next() else {
                break;
            };
            push_escaped(&mut html, c);
            index += c.len_utf8();
        }
    }

    match open.pop() {
        Some((emphasis, position)) => Err(RenderError::UnclosedEmphasis {
            marker: emphasis.marker(),
            position,
        }),
        None => Ok(html),
    }
}

/// Open or close `emphasis`. Closing across another open marker is an error.
fn toggle(
    html: &mut String,
    open: &mut Vec<(Emphasis, usize)>,
    emphasis: Emphasis,
    position: usize,
) -> Result<(), RenderError> {
    match open.last().copied() {
        Some((top, _)) if top == emphasis => {
            open.pop();
            html.push_str(&format!("</{}>", emphasis.tag()));
        }
        Some((top, top_position)) if open.iter().any(|(e, _)| *e == emphasis) => {
            return Err(RenderError::UnclosedEmphasis {
                marker: top.marker(),
                position: top_position,
            });
        }
        _ => {
            open.push((emphasis, position));
            html.push_str(&format!("<{}>", emphasis.tag()));
        }
    }
    Ok(())
}

fn push_escaped(html: &mut String, c: char) {
    match c {
        '&' => html.push_str("&amp;"),
        '<' => html.push_str("&lt;"),
        '>' => html.push_str("&gt;"),
        '"' => html.push_str("&quot;"),
        '\'' => html.push_str("&#39;"),
        _ => html.push(c),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut escaped, c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Markup Tests ====================

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(
            render_rich_text("1 < 2 & \"x\"", Language::English),
            "1 &lt; 2 &amp; &quot;x&quot;"
        );
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            render_rich_text("**Total:** *approx*", Language::English),
            "<strong>Total:</strong> <em>approx</em>"
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            render_rich_text("**very *important* indeed**", Language::English),
            "<strong>very <em>important</em> indeed</strong>"
        );
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(
            render_rich_text("**Índice** de masa", Language::Spanish),
            "<strong>Índice</strong> de masa"
        );
    }

    // ==================== Link Tests ====================

    #[test]
    fn test_internal_link_is_localized() {
        assert_eq!(
            render_rich_text("See [BMI](/bmi-calculator)", Language::Spanish),
            r#"See <a href="/es/bmi-calculator">BMI</a>"#
        );
    }

    #[test]
    fn test_external_and_reserved_links_unchanged() {
        assert_eq!(
            render_rich_text("[docs](https://example.com/a?b=1&c=2)", Language::French),
            r#"<a href="https://example.com/a?b=1&amp;c=2">docs</a>"#
        );
        assert_eq!(
            render_rich_text("[backup](/api/backup)", Language::French),
            r#"<a href="/api/backup">backup</a>"#
        );
    }

    #[test]
    fn test_link_label_is_escaped() {
        assert_eq!(
            render_rich_text("[<b>](/x)", Language::English),
            r#"<a href="/x">&lt;b&gt;</a>"#
        );
    }

    // ==================== Fallback Tests ====================

    #[test]
    fn test_unclosed_bold_is_error() {
        assert_eq!(
            try_render_rich_text("a **b", Language::English),
            Err(RenderError::UnclosedEmphasis {
                marker: "**",
                position: 2
            })
        );
    }

    #[test]
    fn test_crossed_emphasis_is_error() {
        assert!(try_render_rich_text("**a *b** c*", Language::English).is_err());
    }

    #[test]
    fn test_malformed_link_is_error() {
        assert_eq!(
            try_render_rich_text("Price [USD", Language::English),
            Err(RenderError::MalformedLink { position: 6 })
        );
    }

    #[test]
    fn test_malformed_input_falls_back_to_plain_text() {
        assert_eq!(
            render_rich_text("<i>**unclosed", Language::English),
            "&lt;i&gt;**unclosed"
        );
        assert_eq!(
            render_rich_text("[broken](link", Language::German),
            "[broken](link"
        );
    }
}
