//! Static asset mirroring.

use std::fs;
use std::io;
use std::path::Path;

/// Asset subtree that is rebuilt from scratch on every run.
pub const ASSETS_DIR: &str = "assets";

/// Generated highlighting stylesheet, relative to [`ASSETS_DIR`].
pub const SYNTAX_CSS: &str = "syntax.css";

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Copy a file byte-for-byte, creating parent directories.
    pub fn copy_file(source: &Path, dest: &Path) -> io::Result<u64> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, dest)
    }

    /// Write generated content, creating parent directories.
    pub fn write_file(dest: &Path, content: &[u8]) -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, content)
    }

    /// Remove a previous output subtree. Returns whether anything was removed.
    pub fn reset_dir(path: &Path) -> io::Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(true)
    }

    /// Write the highlighting stylesheet unless the site ships its own.
    ///
    /// Returns whether the file was generated.
    pub fn ensure_highlight_css(output_dir: &Path) -> io::Result<bool> {
        let path = output_dir.join(ASSETS_DIR).join(SYNTAX_CSS);
        if path.exists() {
            return Ok(false);
        }

        let Some(css) = folio_markdown::highlight_stylesheet() else {
            return Ok(false);
        };

        Self::write_file(&path, css.as_bytes())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_into_new_directories() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("logo.svg");
        fs::write(&source, b"<svg/>").unwrap();
        let dest = temp.path().join("out/assets/img/logo.svg");

        AssetPipeline::copy_file(&source, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"<svg/>");
    }

    #[test]
    fn reset_removes_whole_subtree() {
        let temp = tempdir().unwrap();
        let assets = temp.path().join("assets");
        fs::create_dir_all(assets.join("css")).unwrap();
        fs::write(assets.join("css/stale.css"), "old").unwrap();

        assert!(AssetPipeline::reset_dir(&assets).unwrap());
        assert!(!assets.exists());
        assert!(!AssetPipeline::reset_dir(&assets).unwrap());
    }

    #[test]
    fn keeps_site_provided_stylesheet() {
        let temp = tempdir().unwrap();
        let css = temp.path().join(ASSETS_DIR).join(SYNTAX_CSS);
        AssetPipeline::write_file(&css, b"/* custom */").unwrap();

        assert!(!AssetPipeline::ensure_highlight_css(temp.path()).unwrap());
        assert_eq!(fs::read_to_string(&css).unwrap(), "/* custom */");
    }

    #[test]
    fn generates_missing_stylesheet() {
        let temp = tempdir().unwrap();

        assert!(AssetPipeline::ensure_highlight_css(temp.path()).unwrap());
        assert!(temp.path().join("assets/syntax.css").exists());
    }
}
