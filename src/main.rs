//! Reel-Harvest main entry point
//!
//! This is the command-line interface for the Reel-Harvest catalog harvester.

use anyhow::Context;
use clap::Parser;
use reel_harvest::config::{load_config_with_hash, Config};
use reel_harvest::crawler::run_harvest;
use reel_harvest::output::{print_statistics, print_summary, CatalogStatistics};
use reel_harvest::storage::{CatalogStore, CheckpointStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reel-Harvest: a resumable catalog harvester
///
/// Walks the site's listing pages, captures a record for every new item,
/// and checkpoints progress so an interrupted run picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "reel-harvest")]
#[command(version)]
#[command(about = "A resumable catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show where a run would resume without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the stored catalog and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config);
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reel_harvest=info,warn"),
            1 => EnvFilter::new("reel_harvest=debug,info"),
            2 => EnvFilter::new("reel_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration and resume point
fn handle_dry_run(config: &Config) {
    println!("=== Reel-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  First listing page: {}", config.site.listing_url(1));

    println!("\nFetcher:");
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nCrawler:");
    println!("  Batch size: {} pages", config.crawler.batch_size);
    println!(
        "  Delay between items: {}-{}ms",
        config.crawler.min_delay_ms, config.crawler.max_delay_ms
    );

    println!("\nOutput:");
    println!("  Catalog: {}", config.output.catalog_path.display());
    println!("  Checkpoint: {}", config.output.checkpoint_path.display());

    let catalog = CatalogStore::new(config.output.catalog_path.clone()).load();
    let checkpoint = CheckpointStore::new(config.output.checkpoint_path.clone()).load();

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would resume from page {} with {} items in the catalog",
        checkpoint,
        catalog.len()
    );
}

/// Handles the --stats mode: summarizes the stored catalog
fn handle_stats(config: &Config) {
    println!("Catalog: {}\n", config.output.catalog_path.display());

    let catalog = CatalogStore::new(config.output.catalog_path.clone()).load();
    let checkpoint = CheckpointStore::new(config.output.checkpoint_path.clone()).load();

    print_statistics(&CatalogStatistics::from_catalog(&catalog, checkpoint));
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting harvest (will resume from the stored checkpoint)");

    match run_harvest(config).await {
        Ok(summary) => {
            tracing::info!("All pages harvested successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
