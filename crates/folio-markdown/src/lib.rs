//! Markdown rendering with YAML front matter.
//!
//! This crate splits source documents into front matter and body, and renders
//! Markdown bodies to HTML with tables, heading anchors, a table of contents,
//! syntax highlighted code blocks and smart punctuation.

pub mod codeblock;
pub mod document;
pub mod frontmatter;
pub mod parser;
pub mod toc;

pub use codeblock::{fence_language, highlight_code, highlight_stylesheet};
pub use document::Document;
pub use frontmatter::{
    extract_frontmatter, read_frontmatter, split_frontmatter, Disposition, FrontMatter,
    FrontmatterError,
};
pub use parser::{render_markdown, RenderedDoc};
pub use toc::{render_toc, slugify, TocEntry};

/// Escape text for use in HTML content and attribute values.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
