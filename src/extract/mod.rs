//! Markup extraction for listing and detail pages
//!
//! The rules here are fixed to the harvested site's markup conventions:
//! - `pagination` reads the total page count from the first listing page
//! - `listing` collects item detail URLs from a listing page
//! - `detail` turns an item page into an [`ItemRecord`]
//!
//! None of these functions fail. Missing markup resolves to documented
//! defaults so a malformed page never interrupts a crawl.

mod detail;
mod listing;
mod pagination;

pub use detail::{
    classify_link, derive_streaming_embed, extract_download_links, extract_item, DownloadLinks,
    ItemRecord, NO_STREAMING_LINK, NO_TITLE,
};
pub use listing::extract_item_urls;
pub use pagination::discover_total_pages;
