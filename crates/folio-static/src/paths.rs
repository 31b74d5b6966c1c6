//! Mapping source paths to output paths, links and default titles.

use std::path::{Component, Path, PathBuf};

/// Output file for the site's landing page.
pub const INDEX_FILE: &str = "index.html";

const README_STEM: &str = "readme";
const GUIDE_SUFFIX: &str = "_guide";

/// How a source file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Rendered through the Markdown pipeline
    Markdown,
    /// Wrapped in the layout or copied, depending on front matter
    Html,
    /// Copied verbatim
    Asset,
}

impl SourceKind {
    /// Classify a file by extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "md" => Self::Markdown,
            "html" => Self::Html,
            _ => Self::Asset,
        }
    }
}

/// Lower-case a file stem and drop a trailing `_guide` token.
pub fn normalize_stem(stem: &str) -> String {
    let lower = stem.to_lowercase();
    match lower.strip_suffix(GUIDE_SUFFIX) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => lower,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_top_level(relative: &Path) -> bool {
    relative
        .parent()
        .map_or(true, |p| p.as_os_str().is_empty())
}

/// Output path (relative to the output root) of a Markdown source.
///
/// `docs/FEATURE_FLAGS_GUIDE.md` -> `docs/feature_flags.html`, and the
/// top-level readme becomes `index.html`.
pub fn markdown_output(relative: &Path) -> PathBuf {
    let name = normalize_stem(&file_stem(relative));

    if is_top_level(relative) && name == README_STEM {
        return PathBuf::from(INDEX_FILE);
    }

    let parent = relative.parent().unwrap_or(Path::new(""));
    parent.join(format!("{}.html", name))
}

/// Output path of an HTML source or static asset: the same relative path.
pub fn mirrored_output(relative: &Path) -> PathBuf {
    relative.to_path_buf()
}

/// Title-case text the way document titles are derived from file names.
///
/// Each run of letters starts upper-case and continues lower-case.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Title for a Markdown page without a `title` key.
pub fn default_markdown_title(relative: &Path) -> String {
    title_case(&file_stem(relative).replace('_', " "))
}

/// Title for a wrapped HTML page without a `title` key.
pub fn default_html_title(relative: &Path) -> String {
    if relative == Path::new(INDEX_FILE) {
        "Home".to_string()
    } else {
        "Untitled".to_string()
    }
}

/// Link to an output file relative to the output root, `/`-separated.
pub fn page_link(output_relative: &Path) -> String {
    output_relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Site-absolute URL of an output file, as substituted for `{{ page.url }}`.
pub fn page_url(output_relative: &Path) -> String {
    format!("/{}", page_link(output_relative))
}
