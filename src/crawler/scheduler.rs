//! Page range and pacing for the crawl loop
//!
//! This module handles:
//! - Deciding which listing pages a run visits, given the stored checkpoint
//! - Deciding after which pages progress is flushed to disk
//! - The randomized politeness pause between item fetches

use crate::config::CrawlerConfig;
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

/// The listing pages a run visits, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub total_pages: u32,
}

impl PageRange {
    /// Builds the range for a run resuming from `checkpoint`
    ///
    /// The checkpointed page itself is visited again; dedup makes that safe.
    /// The start is never moved below `checkpoint`: when the checkpoint lies
    /// past the last page (page 1 could not be fetched, or the site shrank)
    /// the range is empty and the stored checkpoint is left alone.
    pub fn resume(checkpoint: u32, total_pages: u32) -> Self {
        Self {
            start: checkpoint.max(1),
            total_pages: total_pages.max(1),
        }
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.total_pages
    }

    /// Returns true if there is no page left to visit
    pub fn is_empty(&self) -> bool {
        self.start > self.total_pages
    }

    /// Returns true if progress is flushed after finishing `page`
    ///
    /// That is every `batch_size`-th page, plus the final page.
    pub fn is_checkpoint_page(&self, page: u32, batch_size: u32) -> bool {
        page == self.total_pages || (batch_size > 0 && page % batch_size == 0)
    }
}

/// Randomized pause between item fetches
#[derive(Debug, Clone, Copy)]
pub struct PolitenessDelay {
    min_ms: u64,
    max_ms: u64,
}

impl PolitenessDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.min_delay_ms, config.max_delay_ms)
    }

    /// Picks a delay uniformly from the configured range
    pub fn next_delay(&self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::trace!("Pausing {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
