//! Failure artifacts.
//!
//! When a run dies the only useful evidence is what the page looked like at
//! that moment, so the agent drops a screenshot under the artifact directory.
//! Artifacts are diagnostic only; nothing reads them back programmatically.

use std::fs;
use std::path::{Path, PathBuf};

use crate::result::FicharResult;

/// Writes diagnostic artifacts under a target directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a PNG screenshot named `<tag>-<timestamp>.png`, creating the
    /// directory if needed. Returns the written path.
    pub fn write_screenshot(&self, tag: &str, bytes: &[u8]) -> FicharResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = self.dir.join(format!("{tag}-{stamp}.png"));
        fs::write(&path, bytes)?;
        Ok(path)
    }
}
