//! Fenced code block highlighting.

use std::sync::OnceLock;

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::html_escape;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Language tag from a code fence info string.
///
/// Supports plain tags (`rust`) and the attribute form (`{.rust}`).
pub fn fence_language(info: &str) -> Option<&str> {
    let tag = info.split_whitespace().next()?;
    let tag = tag.trim_start_matches('{').trim_end_matches('}');
    let tag = tag.trim_start_matches('.');
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let ss = syntax_set();
    ss.find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_extension(&lang.to_lowercase()))
}

/// Render a fenced code block as a highlighted HTML block.
///
/// Tokens are wrapped in class-based spans so the site stylesheet controls
/// colors. Unknown languages fall back to escaped plain text.
pub fn highlight_code(code: &str, lang: Option<&str>) -> String {
    let class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();

    let body = lang
        .and_then(find_syntax)
        .and_then(|syntax| classed_html(code, syntax))
        .unwrap_or_else(|| html_escape(code));

    format!(
        "<div class=\"codehilite\"><pre><code{}>{}</code></pre></div>\n",
        class, body
    )
}

fn classed_html(code: &str, syntax: &SyntaxReference) -> Option<String> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set(), ClassStyle::Spaced);

    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!("Highlighting failed for {}: {}", syntax.name, e);
            return None;
        }
    }

    Some(generator.finalize())
}

/// Theme used for the generated highlighting stylesheet.
pub const STYLESHEET_THEME: &str = "InspiredGitHub";

/// CSS coloring the spans emitted by [`highlight_code`].
pub fn highlight_stylesheet() -> Option<String> {
    let themes = ThemeSet::load_defaults();
    let theme = themes.themes.get(STYLESHEET_THEME)?;

    match css_for_theme_with_class_style(theme, ClassStyle::Spaced) {
        Ok(css) => Some(css),
        Err(e) => {
            tracing::warn!("Failed to generate highlighting stylesheet: {}", e);
            None
        }
    }
}
