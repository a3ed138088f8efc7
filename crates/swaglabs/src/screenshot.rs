//! Screenshot files on disk.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::result::{SwagError, SwagResult};

/// Writes named PNG captures into one output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a capture named `name` is written to
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.png", file_stem(name)))
    }

    /// Write `png` as `name`, replacing any earlier capture of that name
    pub fn save(&self, name: &str, png: &[u8]) -> SwagResult<PathBuf> {
        if png.is_empty() {
            return Err(SwagError::ScreenshotError {
                message: format!("capture {name:?} is empty"),
            });
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let mut file = File::create(&path)?;
        file.write_all(png)?;
        file.flush()?;
        debug!(path = %path.display(), bytes = png.len(), "screenshot written");
        Ok(path)
    }
}

/// Capture name reduced to a safe file stem
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "screenshot".to_string()
    } else {
        stem
    }
}
