//! Site and build configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

/// Name of the optional site configuration file at the source root.
pub const CONFIG_FILE: &str = "_config.yml";

/// Directory holding the layout template.
pub const LAYOUTS_DIR: &str = "_layouts";

/// File name of the layout template inside [`LAYOUTS_DIR`].
pub const DEFAULT_LAYOUT: &str = "default.html";

/// Default output directory, created inside the source root.
pub const OUTPUT_DIR: &str = "_site";

/// Site-wide settings read from `_config.yml`.
///
/// Keys left empty fall back to their defaults, and numeric or boolean
/// values are read as text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(from = "RawSiteConfig")]
pub struct SiteConfig {
    /// Path prefix the site is served under (e.g. `/project`)
    pub baseurl: String,

    /// Site title
    pub title: String,

    /// Site description
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            baseurl: String::new(),
            title: "Documentation".to_string(),
            description: String::new(),
        }
    }
}

/// `_config.yml` as written, before empty keys fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSiteConfig {
    baseurl: Option<Value>,
    title: Option<Value>,
    description: Option<Value>,
}

fn scalar_text(key: &str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        _ => {
            tracing::warn!("Ignoring non-scalar `{}` in {}", key, CONFIG_FILE);
            None
        }
    }
}

impl From<RawSiteConfig> for SiteConfig {
    fn from(raw: RawSiteConfig) -> Self {
        let defaults = Self::default();
        Self {
            baseurl: scalar_text("baseurl", raw.baseurl).unwrap_or(defaults.baseurl),
            title: scalar_text("title", raw.title).unwrap_or(defaults.title),
            description: scalar_text("description", raw.description)
                .unwrap_or(defaults.description),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {0}")]
    ReadError(String),

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },
}

impl SiteConfig {
    /// Load the site configuration, falling back to defaults when the file is absent.
    ///
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content).map_err(|message| ConfigError::ParseError {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse configuration text. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}

/// Configuration for one build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Documentation root
    pub source_dir: PathBuf,

    /// Output directory (may live inside the source root)
    pub output_dir: PathBuf,

    /// Layout template file
    pub layout_path: PathBuf,

    /// Site settings
    pub site: SiteConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::with_root(Path::new("."), SiteConfig::default())
    }
}

impl BuildConfig {
    /// Conventional layout under `root` with the given site settings.
    pub fn with_root(root: &Path, site: SiteConfig) -> Self {
        Self {
            source_dir: root.to_path_buf(),
            output_dir: root.join(OUTPUT_DIR),
            layout_path: root.join(LAYOUTS_DIR).join(DEFAULT_LAYOUT),
            site,
        }
    }

    /// Conventional layout under `root`, reading `root/_config.yml`.
    pub fn for_root(root: &Path) -> Result<Self, ConfigError> {
        let site = SiteConfig::load(&root.join(CONFIG_FILE))?;
        if site != SiteConfig::default() {
            tracing::info!("Loaded config from {}", CONFIG_FILE);
        }
        Ok(Self::with_root(root, site))
    }
}
