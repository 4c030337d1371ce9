//! Configuration module for Reel-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted keys fall back to the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use reel_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Checkpointing every {} pages", config.crawler.batch_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetcherConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
