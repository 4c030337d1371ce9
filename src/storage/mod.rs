//! Storage module for persisting harvest progress
//!
//! This module owns the two on-disk files of a harvest:
//! - the catalog, a JSON array of captured item records
//! - the checkpoint, the last page whose work has been flushed
//!
//! Both are written through [`write_atomic`], so a crash mid-write leaves the
//! previously committed file intact.

mod catalog;
mod checkpoint;

pub use catalog::{Catalog, CatalogStore};
pub use checkpoint::CheckpointStore;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing persisted state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Returns the sibling temporary path used while replacing `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Replaces the file at `path` with `contents` atomically
///
/// The contents are written in full to a temporary file next to `path`,
/// flushed to disk, and then renamed over `path`. Readers see either the old
/// file or the new one, never a partial write. On failure the temporary file
/// is removed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let io_err = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = temp_path(path);
    let result = replace_with(&tmp, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result.map_err(io_err)
}

fn replace_with(tmp: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    {
        let mut file = File::create(tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(tmp, path)
}
