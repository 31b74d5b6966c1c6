//! Static site builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::{DirEntry, WalkDir};

use folio_markdown::{render_markdown, Disposition, Document};

use crate::assets::{AssetPipeline, ASSETS_DIR, SYNTAX_CSS};
use crate::config::{BuildConfig, CONFIG_FILE, LAYOUTS_DIR};
use crate::layout::{Layout, LayoutError, PageContext};
use crate::nav::highlight_active;
use crate::paths::{self, SourceKind, INDEX_FILE};

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of Markdown pages rendered
    pub pages: usize,

    /// Number of HTML pages wrapped in the layout
    pub wrapped: usize,

    /// Number of files copied verbatim
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Failed to read {0}")]
    ReadError(String),

    #[error("Failed to walk source directory: {0}")]
    WalkError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Output files written so far, keyed by path relative to the output root.
#[derive(Debug, Default)]
struct OutputTree {
    sources: HashMap<PathBuf, PathBuf>,
}

impl OutputTree {
    /// Record that `source` produces `output`, warning when another source already did.
    fn claim(&mut self, output: &Path, source: &Path) {
        if let Some(previous) = self
            .sources
            .insert(output.to_path_buf(), source.to_path_buf())
        {
            tracing::warn!(
                "{} and {} both map to {}; keeping the latter",
                previous.display(),
                source.display(),
                output.display()
            );
        }
    }

    fn contains(&self, output: &Path) -> bool {
        self.sources.contains_key(output)
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    layout: Layout,
}

impl StaticBuilder {
    /// Create a new static builder, loading the layout template.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let layout = Layout::load(&config.layout_path)?;
        Ok(Self::with_layout(config, layout))
    }

    /// Create a builder around an already loaded layout.
    pub fn with_layout(config: BuildConfig, layout: Layout) -> Self {
        Self { config, layout }
    }

    /// Build the static site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let source_dir = fs::canonicalize(&self.config.source_dir).map_err(|e| {
            BuildError::ReadError(format!("{}: {}", self.config.source_dir.display(), e))
        })?;

        // Ensure output directory exists
        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            BuildError::WriteError(format!("{}: {}", self.config.output_dir.display(), e))
        })?;
        let output_dir = fs::canonicalize(&self.config.output_dir).map_err(|e| {
            BuildError::ReadError(format!("{}: {}", self.config.output_dir.display(), e))
        })?;

        let assets = output_dir.join(ASSETS_DIR);
        if AssetPipeline::reset_dir(&assets)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", assets.display(), e)))?
        {
            tracing::debug!("Removed previous {}", assets.display());
        }

        let mut result = BuildResult {
            pages: 0,
            wrapped: 0,
            copied: 0,
            duration_ms: 0,
            output_dir: self.config.output_dir.clone(),
        };
        let mut tree = OutputTree::default();

        for path in self.discover_sources(&source_dir, &output_dir)? {
            let relative = path.strip_prefix(&source_dir).unwrap_or(&path).to_path_buf();

            match SourceKind::from_path(&relative) {
                SourceKind::Markdown => {
                    self.build_markdown(&path, &relative, &output_dir, &mut tree)?;
                    result.pages += 1;
                }
                SourceKind::Html => {
                    if self.build_html(&path, &relative, &output_dir, &mut tree)? {
                        result.wrapped += 1;
                    } else {
                        result.copied += 1;
                    }
                }
                SourceKind::Asset => {
                    self.copy_verbatim(&path, &relative, &output_dir, &mut tree)?;
                    result.copied += 1;
                }
            }
        }

        if !tree.contains(Path::new(INDEX_FILE)) {
            tracing::warn!("No README.md or index.html found; the site has no index page");
        }

        match AssetPipeline::ensure_highlight_css(&output_dir) {
            Ok(true) => tracing::info!("Generated {}/{}", ASSETS_DIR, SYNTAX_CSS),
            Ok(false) => {}
            Err(e) => return Err(BuildError::WriteError(e.to_string())),
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Collect source files in a stable order, skipping layouts and the output tree.
    fn discover_sources(
        &self,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, BuildError> {
        let layouts_dir = source_dir.join(LAYOUTS_DIR);
        let config_file = source_dir.join(CONFIG_FILE);
        let layout_file = fs::canonicalize(&self.config.layout_path).ok();

        let excluded = |entry: &DirEntry| {
            let path = entry.path();
            path == layouts_dir
                || path == output_dir
                || path == config_file
                || layout_file.as_deref() == Some(path)
        };

        let mut files = Vec::new();

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !excluded(e))
        {
            let entry = entry.map_err(|e| BuildError::WalkError(e.to_string()))?;

            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Render a Markdown source through the layout.
    fn build_markdown(
        &self,
        path: &Path,
        relative: &Path,
        output_dir: &Path,
        tree: &mut OutputTree,
    ) -> Result<(), BuildError> {
        let output = paths::markdown_output(relative);
        tracing::info!("Converting {} to {}", relative.display(), output.display());

        let doc = Document::read(path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

        let title = doc
            .front_matter
            .title()
            .unwrap_or_else(|| paths::default_markdown_title(relative));

        let rendered = render_markdown(doc.body());

        self.write_page(&rendered.html, &title, relative, &output, output_dir, tree)
    }

    /// Wrap an HTML source in the layout, or copy it when it names no layout.
    ///
    /// Returns whether the page was wrapped.
    fn build_html(
        &self,
        path: &Path,
        relative: &Path,
        output_dir: &Path,
        tree: &mut OutputTree,
    ) -> Result<bool, BuildError> {
        let bytes =
            fs::read(path).map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

        let Ok(raw) = String::from_utf8(bytes) else {
            tracing::debug!("{} is not UTF-8, copying as-is", relative.display());
            self.copy_verbatim(path, relative, output_dir, tree)?;
            return Ok(false);
        };

        let doc = Document::parse(path, raw);

        match doc.disposition() {
            Disposition::Copy => {
                self.copy_verbatim(path, relative, output_dir, tree)?;
                Ok(false)
            }
            Disposition::Wrap(front_matter) => {
                tracing::info!("Processing HTML file: {}", relative.display());

                let output = paths::mirrored_output(relative);
                let title = front_matter
                    .title()
                    .unwrap_or_else(|| paths::default_html_title(relative));

                self.write_page(doc.body(), &title, relative, &output, output_dir, tree)?;
                Ok(true)
            }
        }
    }

    /// Compose a page into the layout, mark its navigation link and write it.
    fn write_page(
        &self,
        content: &str,
        title: &str,
        relative: &Path,
        output: &Path,
        output_dir: &Path,
        tree: &mut OutputTree,
    ) -> Result<(), BuildError> {
        let url = paths::page_url(output);
        let html = self.layout.render(&PageContext {
            content,
            title,
            url: Some(&url),
            site: &self.config.site,
        });
        let html = highlight_active(&html, &paths::page_link(output), &self.config.site.baseurl);

        tree.claim(output, relative);

        let dest = output_dir.join(output);
        AssetPipeline::write_file(&dest, html.as_bytes())
            .map_err(|e| BuildError::WriteError(format!("{}: {}", dest.display(), e)))
    }

    /// Copy a file to its mirrored location.
    fn copy_verbatim(
        &self,
        path: &Path,
        relative: &Path,
        output_dir: &Path,
        tree: &mut OutputTree,
    ) -> Result<(), BuildError> {
        let output = paths::mirrored_output(relative);
        tree.claim(&output, relative);

        let dest = output_dir.join(&output);
        AssetPipeline::copy_file(path, &dest)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", dest.display(), e)))?;

        tracing::info!("Copied {}", relative.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    const LAYOUT: &str = "<title>{{ page.title }}</title>{{ content }}";

    fn site(root: &Path, layout: &str) -> BuildConfig {
        fs::create_dir_all(root.join(LAYOUTS_DIR)).unwrap();
        fs::write(root.join(LAYOUTS_DIR).join("default.html"), layout).unwrap();
        BuildConfig::for_root(root).unwrap()
    }

    fn build(config: BuildConfig) -> BuildResult {
        StaticBuilder::new(config).unwrap().build().unwrap()
    }

    fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(dir).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn builds_readme_as_index() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(temp.path().join("README.md"), "---\ntitle: Home\n---\n# Welcome\n").unwrap();

        let result = build(config);

        assert_eq!(result.pages, 1);
        let index = fs::read_to_string(temp.path().join("_site/index.html")).unwrap();
        assert_eq!(index, "<title>Home</title><h1 id=\"welcome\">Welcome</h1>\n");
    }

    #[test]
    fn renames_markdown_pages_and_derives_titles() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(temp.path().join("FEATURE_FLAGS_GUIDE.md"), "Flags.\n").unwrap();
        fs::create_dir_all(temp.path().join("guides")).unwrap();
        fs::write(temp.path().join("guides/Getting_Started.md"), "Start.\n").unwrap();

        build(config);

        let flags = fs::read_to_string(temp.path().join("_site/feature_flags.html")).unwrap();
        assert!(flags.starts_with("<title>Feature Flags Guide</title>"));
        assert!(temp.path().join("_site/guides/getting_started.html").exists());
    }

    #[test]
    fn highlights_current_page_in_sidebar() {
        let temp = tempdir().unwrap();
        let config = site(
            temp.path(),
            r#"<nav><a href="a.html">A</a><a href="b.html">B</a></nav>{{ content }}"#,
        );
        fs::write(temp.path().join("a.md"), "A page\n").unwrap();
        fs::write(temp.path().join("b.md"), "B page\n").unwrap();

        build(config);

        let b = fs::read_to_string(temp.path().join("_site/b.html")).unwrap();
        assert!(b.starts_with(
            r#"<nav><a href="a.html">A</a><a class="active" href="b.html">B</a></nav>"#
        ));
        let a = fs::read_to_string(temp.path().join("_site/a.html")).unwrap();
        assert!(a.starts_with(
            r#"<nav><a class="active" href="a.html">A</a><a href="b.html">B</a></nav>"#
        ));
    }

    #[test]
    fn nested_index_is_not_the_root_page() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "baseurl: /proj\n").unwrap();
        let config = site(
            temp.path(),
            r#"<nav><a href="/proj/index.html">Home</a><a href="/proj/guides/index.html">Guides</a></nav>{{ content }}"#,
        );
        fs::write(temp.path().join("README.md"), "Home\n").unwrap();
        fs::create_dir_all(temp.path().join("guides")).unwrap();
        fs::write(
            temp.path().join("guides/index.html"),
            "---\nlayout: default\n---\n<p>Guides</p>\n",
        )
        .unwrap();

        build(config);

        let root = fs::read_to_string(temp.path().join("_site/index.html")).unwrap();
        assert!(root.starts_with(
            r#"<nav><a class="active" href="/proj/index.html">Home</a><a href="/proj/guides/index.html">Guides</a></nav>"#
        ));
        let guides = fs::read_to_string(temp.path().join("_site/guides/index.html")).unwrap();
        assert!(guides.starts_with(
            r#"<nav><a href="/proj/index.html">Home</a><a class="active" href="/proj/guides/index.html">Guides</a></nav>"#
        ));
    }

    #[test]
    fn substitutes_page_url() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), "{{ page.url }}");
        fs::create_dir_all(temp.path().join("guides")).unwrap();
        fs::write(temp.path().join("guides/setup.md"), "x").unwrap();

        build(config);

        let page = fs::read_to_string(temp.path().join("_site/guides/setup.html")).unwrap();
        assert_eq!(page, "/guides/setup.html");
    }

    #[test]
    fn wraps_html_with_layout_key() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(
            temp.path().join("about.html"),
            "---\nlayout: default\ntitle: About\n---\n<p>About us</p>",
        )
        .unwrap();
        fs::write(temp.path().join("index.html"), "---\nlayout: default\n---\n<p>Hi</p>").unwrap();

        let result = build(config);

        assert_eq!(result.wrapped, 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("_site/about.html")).unwrap(),
            "<title>About</title><p>About us</p>"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("_site/index.html")).unwrap(),
            "<title>Home</title><p>Hi</p>"
        );
    }

    #[test]
    fn copies_html_without_layout_key_verbatim() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        let raw = "---\ntitle: Raw\n---\n<p>Raw page</p>";
        fs::write(temp.path().join("raw.html"), raw).unwrap();
        fs::write(temp.path().join("plain.html"), "<p>Plain</p>").unwrap();

        let result = build(config);

        assert_eq!(result.wrapped, 0);
        assert_eq!(
            fs::read_to_string(temp.path().join("_site/raw.html")).unwrap(),
            raw
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("_site/plain.html")).unwrap(),
            "<p>Plain</p>"
        );
    }

    #[test]
    fn malformed_front_matter_still_builds() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(temp.path().join("broken.md"), "---\ntitle: [oops\n---\nBody\n").unwrap();

        build(config);

        let page = fs::read_to_string(temp.path().join("_site/broken.html")).unwrap();
        assert_eq!(page, "<title>Broken</title><p>Body</p>\n");
    }

    #[test]
    fn mirrors_assets_and_replaces_stale_ones() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::create_dir_all(temp.path().join("assets/css")).unwrap();
        fs::write(temp.path().join("assets/css/site.css"), "body {}").unwrap();
        fs::create_dir_all(temp.path().join("_site/assets")).unwrap();
        fs::write(temp.path().join("_site/assets/stale.js"), "old").unwrap();

        build(config);

        assert_eq!(
            fs::read_to_string(temp.path().join("_site/assets/css/site.css")).unwrap(),
            "body {}"
        );
        assert!(!temp.path().join("_site/assets/stale.js").exists());
        assert!(temp.path().join("_site/assets/syntax.css").exists());
    }

    #[test]
    fn skips_layouts_config_and_output() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(temp.path().join("_config.yml"), "title: Site\n").unwrap();
        fs::write(temp.path().join(LAYOUTS_DIR).join("extra.html"), "<p>x</p>").unwrap();
        fs::create_dir_all(temp.path().join("_site")).unwrap();
        fs::write(temp.path().join("_site/old.md"), "# Old").unwrap();

        let config = BuildConfig {
            site: SiteConfig::load(&temp.path().join("_config.yml")).unwrap(),
            ..config
        };
        build(config);

        assert!(!temp.path().join("_site/_config.yml").exists());
        assert!(!temp.path().join("_site/_layouts").exists());
        assert!(!temp.path().join("_site/_site").exists());
        assert!(!temp.path().join("_site/old.html").exists());
    }

    #[test]
    fn missing_layout_is_fatal() {
        let temp = tempdir().unwrap();
        let config = BuildConfig::for_root(temp.path()).unwrap();

        let result = StaticBuilder::new(config);

        assert!(matches!(result, Err(BuildError::Layout(LayoutError::NotFound(_)))));
        assert!(!temp.path().join("_site").exists());
    }

    #[test]
    fn builds_without_index_page() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(temp.path().join("notes.md"), "Notes\n").unwrap();

        let result = build(config);

        assert_eq!(result.pages, 1);
        assert!(!temp.path().join("_site/index.html").exists());
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let temp = tempdir().unwrap();
        let config = site(
            temp.path(),
            "<nav><a href=\"index.html\">Home</a><a href=\"guide.html\">Guide</a></nav>{{ content }}",
        );
        fs::write(temp.path().join("README.md"), "---\ntitle: Home\n---\n[TOC]\n\n# Intro\n").unwrap();
        fs::write(
            temp.path().join("GUIDE.md"),
            "## Code\n\n```rust\nfn main() {}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n",
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("assets/img")).unwrap();
        fs::write(temp.path().join("assets/img/logo.svg"), "<svg/>").unwrap();

        build(config.clone());
        let first = snapshot(&temp.path().join("_site"));
        build(config);
        let second = snapshot(&temp.path().join("_site"));

        assert_eq!(first, second);
        assert!(first.contains_key(Path::new("index.html")));
        assert!(first.contains_key(Path::new("guide.html")));
    }

    #[test]
    fn later_source_wins_on_collision() {
        let temp = tempdir().unwrap();
        let config = site(temp.path(), LAYOUT);
        fs::write(temp.path().join("README.md"), "From readme\n").unwrap();
        fs::write(
            temp.path().join("index.html"),
            "---\nlayout: default\ntitle: Landing\n---\n<p>From html</p>",
        )
        .unwrap();

        build(config);

        let index = fs::read_to_string(temp.path().join("_site/index.html")).unwrap();
        assert_eq!(index, "<title>Landing</title><p>From html</p>");
    }
}
