//! Output module for reporting harvest results
//!
//! This module handles:
//! - Counting what a run did (pages visited, items captured, skips)
//! - Summarizing the persisted catalog for the `--stats` mode

pub mod stats;
mod summary;

pub use stats::{print_statistics, CatalogStatistics};
pub use summary::{print_summary, RunSummary};
