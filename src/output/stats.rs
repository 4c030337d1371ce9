//! Statistics over a persisted catalog

use crate::extract::NO_STREAMING_LINK;
use crate::storage::Catalog;
use std::collections::BTreeMap;

/// Catalog statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Total number of items
    pub total_items: usize,

    /// Items that have a poster URL
    pub with_poster: usize,

    /// Items with a derived streaming embed URL
    pub with_streaming_embed: usize,

    /// Items with no classified download link at all
    pub without_downloads: usize,

    /// Number of items offering each server, keyed by server name
    pub items_by_server: BTreeMap<String, usize>,

    /// Last completed page according to the checkpoint file
    pub checkpoint: u32,
}

impl CatalogStatistics {
    /// Computes statistics for a catalog and its checkpoint
    pub fn from_catalog(catalog: &Catalog, checkpoint: u32) -> Self {
        let mut stats = Self {
            total_items: catalog.len(),
            checkpoint,
            ..Self::default()
        };

        for record in catalog.records() {
            if record.poster_url.is_some() {
                stats.with_poster += 1;
            }
            if record.streaming_embed_url != NO_STREAMING_LINK {
                stats.with_streaming_embed += 1;
            }
            if record.download_links.is_empty() {
                stats.without_downloads += 1;
            }
            for server in record.download_links.keys() {
                *stats.items_by_server.entry(server.clone()).or_insert(0) += 1;
            }
        }

        stats
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total items: {}", stats.total_items);
    println!("  Last completed page: {}", stats.checkpoint);
    println!();

    println!("Coverage:");
    println!(
        "  With poster: {} ({:.1}%)",
        stats.with_poster,
        percentage(stats.with_poster, stats.total_items)
    );
    println!(
        "  With streaming embed: {} ({:.1}%)",
        stats.with_streaming_embed,
        percentage(stats.with_streaming_embed, stats.total_items)
    );
    println!(
        "  Without download links: {} ({:.1}%)",
        stats.without_downloads,
        percentage(stats.without_downloads, stats.total_items)
    );
    println!();

    if !stats.items_by_server.is_empty() {
        println!("Items by Server:");
        // Sort servers by count (descending)
        let mut server_counts: Vec<_> = stats.items_by_server.iter().collect();
        server_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (server, count) in server_counts {
            println!("  {}: {}", server, count);
        }
    }
}
