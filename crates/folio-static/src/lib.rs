//! Static site builder for folio documentation.
//!
//! Renders Markdown and HTML sources into a shared layout, marks the active
//! navigation link on each page and mirrors static assets into the output
//! directory.

pub mod assets;
pub mod builder;
pub mod config;
pub mod layout;
pub mod nav;
pub mod paths;

pub use builder::{BuildError, BuildResult, StaticBuilder};
pub use config::{BuildConfig, ConfigError, SiteConfig};
pub use layout::{Layout, LayoutError, PageContext};
pub use nav::highlight_active;
