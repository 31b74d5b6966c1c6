//! Layout template with literal placeholder substitution.

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::SiteConfig;

/// Rendered page body.
pub const CONTENT_TOKEN: &str = "{{ content }}";
/// Page title.
pub const PAGE_TITLE_TOKEN: &str = "{{ page.title }}";
/// Page URL relative to the site root, with a leading `/`.
pub const PAGE_URL_TOKEN: &str = "{{ page.url }}";
/// Resolves to `"<title> - "`, or nothing for an empty title.
pub const TITLE_PREFIX_TOKEN: &str = "{% if page.title %}{{ page.title }} - {% endif %}";
/// `title` from `_config.yml`.
pub const SITE_TITLE_TOKEN: &str = "{{ site.title }}";
/// `description` from `_config.yml`.
pub const SITE_DESCRIPTION_TOKEN: &str = "{{ site.description }}";
/// `baseurl` from `_config.yml`.
pub const SITE_BASEURL_TOKEN: &str = "{{ site.baseurl }}";

static TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = [
        TITLE_PREFIX_TOKEN,
        CONTENT_TOKEN,
        PAGE_TITLE_TOKEN,
        PAGE_URL_TOKEN,
        SITE_TITLE_TOKEN,
        SITE_DESCRIPTION_TOKEN,
        SITE_BASEURL_TOKEN,
    ]
    .iter()
    .map(|token| regex::escape(token))
    .collect::<Vec<_>>()
    .join("|");

    Regex::new(&alternation).expect("Invalid placeholder regex")
});

/// Values substituted into the layout for one page.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    /// Rendered content HTML
    pub content: &'a str,
    /// Page title
    pub title: &'a str,
    /// Site-relative URL; `{{ page.url }}` is left alone when `None`
    pub url: Option<&'a str>,
    /// Site settings
    pub site: &'a SiteConfig,
}

/// Errors that can occur when loading the layout.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Layout file not found at {0}")]
    NotFound(String),

    #[error("Failed to read layout: {0}")]
    ReadError(String),
}

/// The shared HTML skeleton every page is composed into.
#[derive(Debug, Clone)]
pub struct Layout {
    template: String,
}

impl Layout {
    /// Load the layout template from disk.
    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        if !path.is_file() {
            return Err(LayoutError::NotFound(path.display().to_string()));
        }

        let template = fs::read_to_string(path)
            .map_err(|e| LayoutError::ReadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self::from_template(template))
    }

    /// Use an in-memory template.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute every placeholder in a single pass.
    ///
    /// Replacement values are never rescanned, so a title containing
    /// `{{ content }}` is emitted literally.
    pub fn render(&self, page: &PageContext<'_>) -> String {
        TOKENS
            .replace_all(&self.template, |caps: &Captures<'_>| -> String {
                let token = &caps[0];
                resolve(token, page)
                    .unwrap_or(Cow::Borrowed(token))
                    .into_owned()
            })
            .into_owned()
    }
}

fn resolve<'a>(token: &str, page: &PageContext<'a>) -> Option<Cow<'a, str>> {
    let value = match token {
        CONTENT_TOKEN => Cow::Borrowed(page.content),
        PAGE_TITLE_TOKEN => Cow::Borrowed(page.title),
        PAGE_URL_TOKEN => Cow::Borrowed(page.url?),
        TITLE_PREFIX_TOKEN if page.title.is_empty() => Cow::Borrowed(""),
        TITLE_PREFIX_TOKEN => Cow::Owned(format!("{} - ", page.title)),
        SITE_TITLE_TOKEN => Cow::Borrowed(page.site.title.as_str()),
        SITE_DESCRIPTION_TOKEN => Cow::Borrowed(page.site.description.as_str()),
        SITE_BASEURL_TOKEN => Cow::Borrowed(page.site.baseurl.as_str()),
        _ => return None,
    };
    Some(value)
}
