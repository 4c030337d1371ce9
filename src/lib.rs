//! Reel-Harvest: a resumable catalog harvester
//!
//! This crate walks the paginated listing of a movie site, extracts a record
//! for every item detail page, deduplicates records by title, and checkpoints
//! progress to disk so an interrupted run resumes where it left off.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Reel-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Reel-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, FetchResult, Fetcher};
pub use extract::{discover_total_pages, extract_item, extract_item_urls, ItemRecord};
pub use output::RunSummary;
pub use storage::{Catalog, CatalogStore, CheckpointStore};
