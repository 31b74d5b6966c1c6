//! Folio CLI - Markdown and HTML documentation site builder.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Build a static documentation site from Markdown and HTML sources")]
#[command(version)]
pub struct Cli {
    /// Documentation root to build from
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Output directory (defaults to <root>/_site)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout template (defaults to <root>/_layouts/default.html)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Site config file (defaults to <root>/_config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    commands::build::run(commands::build::BuildArgs {
        root: cli.root,
        output: cli.output,
        layout: cli.layout,
        config: cli.config,
    })
}
