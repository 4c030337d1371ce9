//! Per-run counters

/// What a single harvest run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Total listing pages detected on the site
    pub total_pages: u32,

    /// First page visited by this run
    pub start_page: u32,

    /// Listing pages whose items were walked
    pub pages_processed: u32,

    /// Listing pages skipped because they could not be fetched
    pub pages_skipped: u32,

    /// New items added to the catalog
    pub items_captured: u32,

    /// Items whose title was already in the catalog
    pub duplicates: u32,

    /// Item pages that could not be fetched
    pub items_unavailable: u32,

    /// Last page written to the checkpoint file
    pub checkpoint: u32,

    /// Catalog size at the end of the run
    pub catalog_size: usize,
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Pages:");
    println!(
        "  Visited: {} to {} of {}",
        summary.start_page, summary.total_pages, summary.total_pages
    );
    println!("  Processed: {}", summary.pages_processed);
    println!("  Skipped (fetch failed): {}", summary.pages_skipped);
    println!();

    println!("Items:");
    println!("  Captured: {}", summary.items_captured);
    println!("  Already in catalog: {}", summary.duplicates);
    println!("  Unavailable: {}", summary.items_unavailable);
    println!();

    println!("Catalog size: {}", summary.catalog_size);
    println!("Last completed page: {}", summary.checkpoint);
}
