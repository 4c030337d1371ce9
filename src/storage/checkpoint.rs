//! The last completed page number and its plain-text file

use crate::storage::{write_atomic, StorageResult};
use std::path::{Path, PathBuf};

/// Page a harvest starts from when no checkpoint exists
pub const FIRST_PAGE: u32 = 1;

/// Reads and writes the checkpoint file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the last checkpointed page
    ///
    /// Falls back to page 1 when the file is missing or does not hold a
    /// positive decimal integer.
    pub fn load(&self) -> u32 {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!("No checkpoint at {}", self.path.display());
                return FIRST_PAGE;
            }
        };

        match content.trim().parse::<u32>() {
            Ok(page) if page >= FIRST_PAGE => page,
            _ => {
                tracing::warn!(
                    "Ignoring invalid checkpoint '{}' in {}",
                    content.trim(),
                    self.path.display()
                );
                FIRST_PAGE
            }
        }
    }

    /// Records `page` as the last completed page
    pub fn persist(&self, page: u32) -> StorageResult<()> {
        write_atomic(&self.path, page.to_string().as_bytes())
    }
}
