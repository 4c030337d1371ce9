//! Crawler module for listing walks and item fetching
//!
//! This module contains the core harvest logic, including:
//! - HTTP fetching with timeout retries
//! - Page range selection and politeness pacing
//! - Overall harvest coordination

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::{run_harvest, Coordinator, ItemOutcome};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use scheduler::{PageRange, PolitenessDelay};
