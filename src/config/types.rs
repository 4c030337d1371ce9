use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder substituted with the page number in `listing-path`
pub const PAGE_PLACEHOLDER: &str = "{page}";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Reel-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub fetcher: FetcherConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// The site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL that relative item links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of a listing page, with `{page}` standing in for the page number
    #[serde(rename = "listing-path")]
    pub listing_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.watch-movies.com.pk".to_string(),
            listing_path: "/page/{page}/".to_string(),
        }
    }
}

impl SiteConfig {
    /// Builds the absolute URL of listing page `page`
    pub fn listing_url(&self, page: u32) -> String {
        let path = self.listing_path.replace(PAGE_PLACEHOLDER, &page.to_string());
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// HTTP fetch policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Number of attempts made when a request times out
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Per-attempt timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Persist catalog and checkpoint after every page that is a multiple of this
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Lower bound of the pause after each item (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the pause after each item (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON catalog file
    #[serde(rename = "catalog-path")]
    pub catalog_path: PathBuf,

    /// Path to the plain-text checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("movies.json"),
            checkpoint_path: PathBuf::from("last_page.txt"),
        }
    }
}
