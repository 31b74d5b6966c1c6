//! Front matter extraction and parsing.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

/// Metadata parsed from a document's YAML front matter block.
///
/// Only `title` and `layout` are interpreted; every other key is kept as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    data: Mapping,
}

impl FrontMatter {
    /// Create an empty front matter mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already parsed YAML mapping.
    pub fn from_mapping(data: Mapping) -> Self {
        Self { data }
    }

    /// Whether no keys were present.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Whether the key is present, even with a null value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Page title override.
    ///
    /// Strings are returned as-is, numbers and booleans are stringified.
    /// Null and collection values count as absent.
    pub fn title(&self) -> Option<String> {
        match self.get("title")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Layout name, if given as a string.
    pub fn layout(&self) -> Option<&str> {
        self.get("layout").and_then(Value::as_str)
    }

    /// Whether a `layout` key is present at all.
    pub fn has_layout(&self) -> bool {
        self.contains_key("layout")
    }
}

/// What to do with an HTML source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Disposition<'a> {
    /// Copy the file byte-for-byte.
    Copy,
    /// Wrap the body in the site layout.
    Wrap(&'a FrontMatter),
}

impl<'a> Disposition<'a> {
    /// Wrap when the front matter names a layout, copy otherwise.
    pub fn of(front_matter: &'a FrontMatter) -> Self {
        if front_matter.has_layout() {
            Self::Wrap(front_matter)
        } else {
            Self::Copy
        }
    }
}

/// Errors that can occur when parsing front matter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Invalid YAML in front matter: {0}")]
    InvalidYaml(String),

    #[error("Front matter is not a key/value mapping")]
    NotAMapping,
}

static DELIMITED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)??---[ \t]*(?:\r?\n|\z)")
        .expect("Invalid front matter regex")
});

/// Split a document into its raw YAML block and the body after the closing delimiter.
///
/// Returns `None` when the document does not open with a delimited block.
pub fn split_frontmatter(source: &str) -> Option<(&str, &str)> {
    let caps = DELIMITED.captures(source)?;
    let whole = caps.get(0)?;
    let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    Some((yaml, &source[whole.end()..]))
}

/// Parse a raw YAML block into front matter.
pub fn parse_frontmatter(yaml: &str) -> Result<FrontMatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::new());
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    match value {
        Value::Null => Ok(FrontMatter::new()),
        Value::Mapping(data) => Ok(FrontMatter::from_mapping(data)),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Extract front matter from a document.
///
/// Returns the parsed front matter and the remaining content. A document
/// without delimiters yields empty front matter and the whole source.
pub fn extract_frontmatter(source: &str) -> Result<(FrontMatter, &str), FrontmatterError> {
    match split_frontmatter(source) {
        Some((yaml, body)) => Ok((parse_frontmatter(yaml)?, body)),
        None => Ok((FrontMatter::new(), source)),
    }
}

/// Like [`extract_frontmatter`], but a malformed block only logs a warning.
///
/// The body still starts after the closing delimiter.
pub fn read_frontmatter<'a>(source: &'a str, origin: &Path) -> (FrontMatter, &'a str) {
    let Some((yaml, body)) = split_frontmatter(source) else {
        return (FrontMatter::new(), source);
    };

    match parse_frontmatter(yaml) {
        Ok(front_matter) => (front_matter, body),
        Err(e) => {
            tracing::warn!("Error parsing front matter in {}: {}", origin.display(), e);
            (FrontMatter::new(), body)
        }
    }
}
