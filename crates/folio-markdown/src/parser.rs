//! Markdown to HTML rendering.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::codeblock::{fence_language, highlight_code};
use crate::toc::{render_toc, IdAllocator, TocEntry};

/// Paragraph text replaced by the table of contents.
pub const TOC_MARKER: &str = "[TOC]";

/// A rendered Markdown body.
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    /// HTML fragment
    pub html: String,

    /// Headings in document order, with the ids written into the HTML
    pub toc: Vec<TocEntry>,
}

/// Parser extensions enabled for every page.
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_STRIKETHROUGH
}

/// Render a Markdown body to an HTML fragment.
///
/// Headings get slug ids, fenced code blocks are highlighted and a
/// paragraph holding only `[TOC]` becomes the table of contents.
pub fn render_markdown(body: &str) -> RenderedDoc {
    let events: Vec<Event<'_>> = Parser::new_ext(body, markdown_options()).collect();

    let (events, toc) = assign_heading_ids(events);
    let events = highlight_code_blocks(events);
    let events = insert_toc(events, &toc);

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    RenderedDoc {
        html: html_output,
        toc,
    }
}

/// A heading found while scanning events.
struct HeadingSpan {
    start: usize,
    level: u8,
    title: String,
    explicit_id: Option<String>,
}

fn collect_headings(events: &[Event<'_>]) -> Vec<HeadingSpan> {
    let mut headings = Vec::new();
    let mut current: Option<HeadingSpan> = None;

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some(HeadingSpan {
                    start: index,
                    level: *level as u8,
                    title: String::new(),
                    explicit_id: id.as_ref().map(|s| s.to_string()),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = current.take() {
                    headings.push(heading);
                }
            }
            _ => {}
        }
    }

    headings
}

fn assign_heading_ids(mut events: Vec<Event<'_>>) -> (Vec<Event<'_>>, Vec<TocEntry>) {
    let headings = collect_headings(&events);

    let mut ids = IdAllocator::default();
    for id in headings.iter().filter_map(|h| h.explicit_id.as_deref()) {
        ids.reserve(id);
    }

    let mut toc = Vec::with_capacity(headings.len());
    for heading in headings {
        let id = match heading.explicit_id {
            Some(id) => id,
            None => {
                let id = ids.allocate(&heading.title);
                if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[heading.start] {
                    *slot = Some(CowStr::from(id.clone()));
                }
                id
            }
        };

        toc.push(TocEntry {
            title: heading.title,
            id,
            level: heading.level,
        });
    }

    (events, toc)
}

fn highlight_code_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut result = Vec::with_capacity(events.len());
    // (language, buffered source) while inside a fenced block
    let mut fenced: Option<(Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                fenced = Some((fence_language(&info).map(str::to_string), String::new()));
            }
            Event::Text(text) if fenced.is_some() => {
                if let Some((_, code)) = fenced.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) if fenced.is_some() => {
                if let Some((lang, code)) = fenced.take() {
                    let highlighted = highlight_code(&code, lang.as_deref());
                    result.push(Event::Html(CowStr::from(highlighted)));
                }
            }
            other => result.push(other),
        }
    }

    result
}

fn insert_toc<'a>(events: Vec<Event<'a>>, toc: &[TocEntry]) -> Vec<Event<'a>> {
    let mut result = Vec::with_capacity(events.len());
    let mut index = 0;

    while index < events.len() {
        if matches!(events[index], Event::Start(Tag::Paragraph)) {
            if let Some(end) = toc_marker_end(&events, index) {
                result.push(Event::Html(CowStr::from(render_toc(toc))));
                index = end + 1;
                continue;
            }
        }

        result.push(events[index].clone());
        index += 1;
    }

    result
}

/// Index of the closing paragraph event when the paragraph is only the marker.
fn toc_marker_end(events: &[Event<'_>], start: usize) -> Option<usize> {
    let mut text = String::new();

    for (offset, event) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::End(TagEnd::Paragraph) => {
                return (text.trim() == TOC_MARKER).then_some(start + 1 + offset);
            }
            _ => return None,
        }
    }

    None
}
