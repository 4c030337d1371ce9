//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the page loop that ties the harvest together:
//! - Loading the catalog and checkpoint left by earlier runs
//! - Discovering how many listing pages the site has
//! - Walking listing pages and their items strictly in order
//! - Deduplicating items by title
//! - Flushing catalog and checkpoint at batch boundaries
//!
//! A page counts as complete once its loop iteration finishes, even if its
//! listing or some of its items could not be fetched. Re-fetching such a
//! page on a later run is safe because captured titles are skipped.

use crate::config::{validate, Config};
use crate::crawler::scheduler::{PageRange, PolitenessDelay};
use crate::crawler::{FetchResult, Fetcher};
use crate::extract::{discover_total_pages, extract_item, extract_item_urls};
use crate::output::RunSummary;
use crate::storage::{Catalog, CatalogStore, CheckpointStore};
use crate::HarvestError;
use url::Url;

/// What happened to a single item URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A new record was added to the catalog
    Captured { title: String },

    /// The title was already in the catalog
    Duplicate { title: String },

    /// The item page could not be fetched
    Unavailable,
}

impl ItemOutcome {
    /// Returns true if the item page was fetched and parsed
    ///
    /// Only these items are followed by the politeness pause.
    pub fn was_extracted(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
    base_url: Url,
    catalog_store: CatalogStore,
    checkpoint_store: CheckpointStore,
    delay: PolitenessDelay,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The configuration is invalid or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;

        let base_url = Url::parse(&config.site.base_url)?;
        let fetcher = Fetcher::new(&config.fetcher)?;
        let catalog_store = CatalogStore::new(config.output.catalog_path.clone());
        let checkpoint_store = CheckpointStore::new(config.output.checkpoint_path.clone());
        let delay = PolitenessDelay::from_config(&config.crawler);

        Ok(Self {
            config,
            fetcher,
            base_url,
            catalog_store,
            checkpoint_store,
            delay,
        })
    }

    /// Loads the catalog and checkpoint this run resumes from
    pub fn load_state(&self) -> (Catalog, u32) {
        let catalog = self.catalog_store.load();
        let checkpoint = self.checkpoint_store.load();
        (catalog, checkpoint)
    }

    /// Runs the harvest to completion
    ///
    /// 1. Load catalog and checkpoint
    /// 2. Fetch page 1 and discover the page count (1 if that fails)
    /// 3. Walk pages `checkpoint..=total`, capturing new items
    /// 4. Flush catalog, then checkpoint, after every batch and the last page
    ///
    /// When the checkpoint lies past the detected page count (for instance
    /// because page 1 could not be fetched) no page is walked and neither file
    /// is rewritten, so stored progress is never lowered.
    ///
    /// Fetch failures and parse gaps are skipped, never returned. Only a
    /// failure to write the catalog or checkpoint file ends the run early.
    pub async fn run(&self) -> Result<RunSummary, HarvestError> {
        let (mut catalog, checkpoint) = self.load_state();

        let first_page = self
            .fetcher
            .fetch(&self.config.site.listing_url(1))
            .await
            .into_body();

        let total_pages = match &first_page {
            Some(body) => discover_total_pages(body),
            None => {
                tracing::warn!("Could not fetch the first listing page, assuming a single page");
                1
            }
        };
        tracing::info!("Total pages detected: {}", total_pages);

        let range = PageRange::resume(checkpoint, total_pages);
        if range.is_empty() {
            tracing::warn!(
                "Checkpoint {} is past the last page {}, nothing to harvest",
                checkpoint,
                total_pages
            );
        } else {
            tracing::info!("Resuming from page {}", range.start);
        }

        let mut summary = RunSummary {
            total_pages,
            start_page: range.start,
            checkpoint,
            ..RunSummary::default()
        };

        // Page 1 was just fetched; don't request it twice.
        let mut first_page = first_page.filter(|_| range.start == 1);

        for page in range.pages() {
            tracing::info!("Harvesting page {}/{}", page, total_pages);

            let body = match first_page.take() {
                Some(body) => Some(body),
                None => self
                    .fetcher
                    .fetch(&self.config.site.listing_url(page))
                    .await
                    .into_body(),
            };

            match body {
                Some(body) => {
                    self.process_page(&body, &mut catalog, &mut summary).await;
                    summary.pages_processed += 1;
                }
                None => {
                    tracing::warn!("Skipping page {} due to fetch failure", page);
                    summary.pages_skipped += 1;
                }
            }

            if range.is_checkpoint_page(page, self.config.crawler.batch_size) {
                self.save_progress(&catalog, page)?;
                summary.checkpoint = page;
            }
        }

        summary.catalog_size = catalog.len();
        tracing::info!(
            "Harvest complete: {} new items, {} duplicates, {} items in catalog",
            summary.items_captured,
            summary.duplicates,
            summary.catalog_size
        );

        Ok(summary)
    }

    /// Walks every item on one listing page
    async fn process_page(&self, body: &str, catalog: &mut Catalog, summary: &mut RunSummary) {
        let item_urls = extract_item_urls(body, &self.base_url);
        tracing::debug!("Found {} items on page", item_urls.len());

        for item_url in &item_urls {
            let outcome = self.process_item(item_url, catalog).await;

            match &outcome {
                ItemOutcome::Captured { title } => {
                    tracing::info!("Captured: {}", title);
                    summary.items_captured += 1;
                }
                ItemOutcome::Duplicate { title } => {
                    tracing::info!("Skipping existing item: {}", title);
                    summary.duplicates += 1;
                }
                ItemOutcome::Unavailable => {
                    tracing::warn!("Skipping item {} due to fetch failure", item_url);
                    summary.items_unavailable += 1;
                }
            }

            if outcome.was_extracted() {
                self.delay.pause().await;
            }
        }
    }

    /// Fetches one item page and adds its record if the title is new
    async fn process_item(&self, url: &str, catalog: &mut Catalog) -> ItemOutcome {
        let body = match self.fetcher.fetch(url).await {
            FetchResult::Success { body } => body,
            FetchResult::Unavailable { .. } => return ItemOutcome::Unavailable,
        };

        let record = extract_item(&body);
        let title = record.title.clone();

        if catalog.append(record) {
            ItemOutcome::Captured { title }
        } else {
            ItemOutcome::Duplicate { title }
        }
    }

    /// Persists the catalog, then marks `page` as the last completed page
    ///
    /// The catalog goes first so the checkpoint never points past data that
    /// is not on disk.
    fn save_progress(&self, catalog: &Catalog, page: u32) -> Result<(), HarvestError> {
        self.catalog_store.persist(catalog)?;
        self.checkpoint_store.persist(page)?;
        tracing::info!("Progress saved, last completed page: {}", page);
        Ok(())
    }
}

/// Runs a complete harvest
///
/// # Example
///
/// ```no_run
/// use reel_harvest::config::Config;
/// use reel_harvest::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_harvest(Config::default()).await?;
/// println!("{} new items", summary.items_captured);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<RunSummary, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
