//! Static site build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_static::config::CONFIG_FILE;
use folio_static::{BuildConfig, SiteConfig, StaticBuilder};

/// Paths given on the command line.
#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub root: PathBuf,
    pub output: Option<PathBuf>,
    pub layout: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Resolve command line paths into a build configuration.
fn resolve_config(args: BuildArgs) -> Result<BuildConfig> {
    let config_path = args
        .config
        .unwrap_or_else(|| args.root.join(CONFIG_FILE));
    let site = SiteConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let mut config = BuildConfig::with_root(&args.root, site);
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(layout) = args.layout {
        config.layout_path = layout;
    }

    Ok(config)
}

/// Run the build command.
pub fn run(args: BuildArgs) -> Result<()> {
    let config = resolve_config(args)?;

    tracing::info!(
        "Starting conversion from {} to {}",
        config.source_dir.display(),
        config.output_dir.display()
    );

    let builder = StaticBuilder::new(config).context("Cannot build without a layout")?;
    let result = builder.build().context("Error during conversion")?;

    tracing::info!(
        "Built {} pages, wrapped {} HTML pages and copied {} files in {}ms",
        result.pages,
        result.wrapped,
        result.copied,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
