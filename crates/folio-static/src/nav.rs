//! Active navigation link highlighting.
//!
//! Scans anchor start tags in composed HTML and adds the `active` class to
//! links pointing at the page being built. Bytes outside rewritten tags are
//! left untouched.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::paths::INDEX_FILE;

/// Class token added to the current page's links.
pub const ACTIVE_CLASS: &str = "active";

/// Markup spans in document order.
///
/// Comments, CDATA sections and raw-text elements are matched whole so
/// anchor-like text inside them is never rewritten. Other start and end
/// tags are consumed so their attribute values are skipped too. Only the
/// `tag` alternative is a real anchor.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)",
        r"<!--(?:.*?-->|.*)",
        r"|<!\[CDATA\[(?:.*?\]\]>|.*)",
        r"|<script\b[^>]*>(?:.*?</script\s*>|.*)",
        r"|<style\b[^>]*>(?:.*?</style\s*>|.*)",
        r"|<textarea\b[^>]*>(?:.*?</textarea\s*>|.*)",
        r"|<title\b[^>]*>(?:.*?</title\s*>|.*)",
        r#"|<(?P<tag>a)(?P<attrs>\s(?:[^>"']|"[^"]*"|'[^']*')*)?>"#,
        r#"|<[/!?]?[a-z][^>"']*(?:(?:"[^"]*"|'[^']*')[^>"']*)*>"#,
    ))
    .expect("Invalid markup regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("Invalid attribute regex")
});

/// An attribute inside a start tag.
#[derive(Debug, Clone, PartialEq)]
struct Attribute<'a> {
    name: &'a str,
    value: Option<&'a str>,
    /// Byte range of the whole attribute within the attribute text
    span: Range<usize>,
}

fn parse_attributes(attrs: &str) -> Vec<Attribute<'_>> {
    ATTRIBUTE
        .captures_iter(attrs)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str());
            Some(Attribute {
                name,
                value,
                span: whole.range(),
            })
        })
        .collect()
}

fn find<'a, 'b>(attrs: &'b [Attribute<'a>], name: &str) -> Option<&'b Attribute<'a>> {
    attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}

fn is_scheme(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic())
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn after_host(rest: &str) -> &str {
    rest.find('/').map_or("/", |i| &rest[i..])
}

/// Path part of a URL, or `None` for non-hierarchical schemes like `mailto:`.
fn strip_origin(target: &str) -> Option<&str> {
    if let Some(rest) = target.strip_prefix("//") {
        return Some(after_host(rest));
    }

    match target.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest.strip_prefix("//").map(after_host),
        _ => Some(target),
    }
}

fn push_segments<'a>(out: &mut Vec<&'a str>, segments: impl Iterator<Item = &'a str>) {
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            name => out.push(name),
        }
    }
}

/// Site-relative path an `href` points at, seen from the page at `page_link`.
///
/// Scheme and host are dropped, then the `baseurl` prefix of absolute paths.
/// Relative paths resolve against the page's directory. Fragment and query
/// are ignored, and directory links resolve to their index page.
pub fn resolve_href(href: &str, page_link: &str, baseurl: &str) -> Option<String> {
    let target = href.split(|c: char| c == '#' || c == '?').next().unwrap_or("");
    if target.is_empty() {
        return None;
    }

    let path = strip_origin(target)?;
    let mut segments = Vec::new();

    if let Some(absolute) = path.strip_prefix('/') {
        let base = baseurl.trim_matches('/');
        let within = if base.is_empty() {
            absolute
        } else {
            absolute
                .strip_prefix(base)
                .and_then(|rest| {
                    if rest.is_empty() {
                        Some(rest)
                    } else {
                        rest.strip_prefix('/')
                    }
                })
                .unwrap_or(absolute)
        };
        push_segments(&mut segments, within.split('/'));
    } else {
        if let Some((dir, _)) = page_link.rsplit_once('/') {
            push_segments(&mut segments, dir.split('/'));
        }
        push_segments(&mut segments, path.split('/'));
    }

    let last = path.rsplit('/').next().unwrap_or("");
    if segments.is_empty() || matches!(last, "" | "." | "..") {
        segments.push(INDEX_FILE);
    }

    Some(segments.join("/"))
}

/// Whether an `href` points at the page with the given link.
///
/// `b.html` never matches `ab.html`, and a root page never matches the
/// same file name in a sub-directory.
pub fn href_matches(href: &str, page_link: &str, baseurl: &str) -> bool {
    !page_link.is_empty()
        && resolve_href(href, page_link, baseurl).is_some_and(|path| path == page_link)
}

/// Mark every anchor linking to `page_link` with the `active` class.
///
/// Existing class tokens are kept and anchors already marked are left as
/// they are, so running this twice gives the same result.
pub fn highlight_active(html: &str, page_link: &str, baseurl: &str) -> String {
    MARKUP
        .replace_all(html, |caps: &Captures<'_>| -> String {
            let Some(tag) = caps.name("tag") else {
                return caps[0].to_string();
            };
            let attrs = caps.name("attrs").map_or("", |m| m.as_str());
            mark_active(tag.as_str(), attrs, page_link, baseurl)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Rewritten start tag, or `None` when the anchor stays as it is.
fn mark_active(tag: &str, attrs: &str, page_link: &str, baseurl: &str) -> Option<String> {
    let parsed = parse_attributes(attrs);

    let href = find(&parsed, "href")?.value?;
    if !href_matches(href, page_link, baseurl) {
        return None;
    }

    let Some(class) = find(&parsed, "class") else {
        return Some(format!("<{} class=\"{}\"{}>", tag, ACTIVE_CLASS, attrs));
    };

    let current = class.value.unwrap_or("");
    if current.split_whitespace().any(|token| token == ACTIVE_CLASS) {
        return None;
    }

    let classes = if current.trim().is_empty() {
        ACTIVE_CLASS.to_string()
    } else {
        format!("{} {}", current.trim_end(), ACTIVE_CLASS)
    };

    Some(format!(
        "<{}{}class=\"{}\"{}>",
        tag,
        &attrs[..class.span.start],
        classes.replace('"', "&quot;"),
        &attrs[class.span.end..]
    ))
}
