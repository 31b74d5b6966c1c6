//! Heading anchors and table of contents.

use std::collections::HashSet;

use crate::html_escape;

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Hands out heading ids, suffixing repeats with `_1`, `_2`, ...
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    /// Reserve an id that the author set explicitly.
    pub(crate) fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }

    /// Allocate a unique id for a heading title.
    pub(crate) fn allocate(&mut self, title: &str) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut id = base.clone();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{}_{}", base, n);
            n += 1;
        }

        self.used.insert(id.clone());
        id
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Render entries as a nested list inside `<div class="toc">`.
pub fn render_toc(entries: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    // Levels of the currently open <ul> elements
    let mut open: Vec<u8> = Vec::new();

    for entry in entries {
        match open.last().copied() {
            None => {
                html.push_str("<ul>\n");
                open.push(entry.level);
            }
            Some(top) if entry.level > top => {
                html.push_str("\n<ul>\n");
                open.push(entry.level);
            }
            Some(_) => {
                html.push_str("</li>\n");
                while open.len() > 1 && open.last().is_some_and(|&top| entry.level < top) {
                    open.pop();
                    html.push_str("</ul>\n</li>\n");
                }
            }
        }

        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            html_escape(&entry.id),
            html_escape(&entry.title)
        ));
    }

    if !open.is_empty() {
        html.push_str("</li>\n");
        for _ in 1..open.len() {
            html.push_str("</ul>\n</li>\n");
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</div>\n");
    html
}
