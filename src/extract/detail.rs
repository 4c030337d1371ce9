//! Item record extraction from detail pages

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title used when a detail page has no name element
pub const NO_TITLE: &str = "No Title";

/// Streaming embed value when no eligible download link exists
pub const NO_STREAMING_LINK: &str = "No link found";

/// Mirror names recognized in download link text, in match priority order
const SERVERS: [&str; 3] = ["PkSpeed", "MixDrop", "Streamtape"];

/// Quality labels recognized in download link text, in match priority order
const QUALITIES: [&str; 2] = ["720p", "360p"];

/// Server and quality whose link can be turned into an embed URL
const EMBED_SERVER: &str = "Streamtape";
const EMBED_QUALITY: &str = "720p";

/// Download links grouped by server name, then quality label
pub type DownloadLinks = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A captured catalog item
///
/// The title is the catalog's dedup key. Records are built once from a detail
/// page and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,

    pub poster_url: Option<String>,

    #[serde(default)]
    pub download_links: DownloadLinks,

    #[serde(rename = "streaming_embed", default = "no_streaming_link")]
    pub streaming_embed_url: String,
}

fn no_streaming_link() -> String {
    NO_STREAMING_LINK.to_string()
}

/// Extracts an item record from a detail page
///
/// # Extraction Rules
///
/// | Field | Source | Default |
/// |-------|--------|---------|
/// | title | text of `h1[itemprop=name]` | `"No Title"` |
/// | poster | `src` of `img[itemprop=image]` | `None` |
/// | download links | `a[href]` whose text names a server and a quality | empty |
/// | streaming embed | first Streamtape 720p link | `"No link found"` |
pub fn extract_item(html: &str) -> ItemRecord {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string());
    let poster_url = extract_poster(&document);
    let download_links = extract_download_links(&document);
    let streaming_embed_url = derive_streaming_embed(&download_links);

    ItemRecord {
        title,
        poster_url,
        download_links,
        streaming_embed_url,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"h1[itemprop="name"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

fn extract_poster(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"img[itemprop="image"]"#).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("src"))
        .map(str::to_string)
}

/// Collects every classifiable download link on the page
///
/// Hrefs are kept exactly as written. Several links for the same server and
/// quality are kept in document order.
pub fn extract_download_links(document: &Html) -> DownloadLinks {
    let mut links = DownloadLinks::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let text = element.text().collect::<String>();
        if let Some((server, quality)) = classify_link(text.trim()) {
            links
                .entry(server.to_string())
                .or_default()
                .entry(quality.to_string())
                .or_default()
                .push(href.to_string());
        }
    }

    links
}

/// Classifies anchor text by the server and quality it mentions
///
/// Both a server name and a quality label must appear; when several do, the
/// first in priority order wins.
///
/// ```
/// use reel_harvest::extract::classify_link;
///
/// assert_eq!(classify_link("MixDrop 720p"), Some(("MixDrop", "720p")));
/// assert_eq!(classify_link("720p"), None);
/// assert_eq!(classify_link("MixDrop"), None);
/// ```
pub fn classify_link(text: &str) -> Option<(&'static str, &'static str)> {
    let server = SERVERS.into_iter().find(|server| text.contains(server))?;
    let quality = QUALITIES.into_iter().find(|quality| text.contains(quality))?;
    Some((server, quality))
}

/// Builds the streaming embed URL from the extracted download links
///
/// The video id is the final path segment of the first Streamtape 720p link.
pub fn derive_streaming_embed(links: &DownloadLinks) -> String {
    let first_link = links
        .get(EMBED_SERVER)
        .and_then(|qualities| qualities.get(EMBED_QUALITY))
        .and_then(|urls| urls.first());

    match first_link {
        Some(url) => {
            let video_id = url.rsplit('/').next().unwrap_or_default();
            format!("https://streamtape.com/e/{}/", video_id)
        }
        None => NO_STREAMING_LINK.to_string(),
    }
}
