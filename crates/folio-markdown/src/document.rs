//! Source documents.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::frontmatter::{read_frontmatter, Disposition, FrontMatter};

/// A source file split into front matter and body.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source file path
    pub path: PathBuf,

    /// Full file contents
    pub raw: String,

    /// Parsed front matter (empty when absent or malformed)
    pub front_matter: FrontMatter,

    /// Byte offset where the body starts in `raw`
    body_start: usize,
}

impl Document {
    /// Read and split a file from disk.
    pub fn read(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::parse(path, raw))
    }

    /// Split already loaded text.
    pub fn parse(path: &Path, raw: String) -> Self {
        let (front_matter, body) = read_frontmatter(&raw, path);
        let body_start = raw.len() - body.len();

        Self {
            path: path.to_path_buf(),
            raw,
            front_matter,
            body_start,
        }
    }

    /// Text after the front matter block.
    pub fn body(&self) -> &str {
        &self.raw[self.body_start..]
    }

    /// Copy-or-wrap decision for HTML sources.
    pub fn disposition(&self) -> Disposition<'_> {
        Disposition::of(&self.front_matter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_body_from_front_matter() {
        let doc = Document::parse(
            Path::new("guide.md"),
            "---\ntitle: Guide\n---\n# Guide\n".to_string(),
        );

        assert_eq!(doc.front_matter.title(), Some("Guide".to_string()));
        assert_eq!(doc.body(), "# Guide\n");
        assert_eq!(doc.path, PathBuf::from("guide.md"));
    }

    #[test]
    fn body_is_whole_text_without_front_matter() {
        let raw = "<p>plain</p>\n".to_string();
        let doc = Document::parse(Path::new("page.html"), raw.clone());

        assert_eq!(doc.body(), raw);
        assert_eq!(doc.disposition(), Disposition::Copy);
    }

    #[test]
    fn layout_key_selects_wrap() {
        let doc = Document::parse(
            Path::new("about.html"),
            "---\nlayout: default\n---\n<p>About</p>".to_string(),
        );

        assert!(matches!(doc.disposition(), Disposition::Wrap(fm) if fm.layout() == Some("default")));
        assert_eq!(doc.body(), "<p>About</p>");
    }
}
