//! Item URL extraction from listing pages

use scraper::{Html, Selector};
use url::Url;

/// Marker class the site puts on the thumbnail anchor of every listed item
const ITEM_ANCHOR_SELECTOR: &str = "a.thumnail-imagee";

/// Extracts the detail page URLs of every item on a listing page
///
/// URLs are returned in document order. Relative hrefs are resolved against
/// `base_url`; anchors without an `href`, or whose href cannot be resolved,
/// are skipped.
///
/// # Example
///
/// ```
/// use reel_harvest::extract_item_urls;
/// use url::Url;
///
/// let html = r#"<a class="thumnail-imagee" href="/movie/heat-1995/">Heat</a>"#;
/// let base = Url::parse("https://movies.example.com").unwrap();
/// assert_eq!(
///     extract_item_urls(html, &base),
///     vec!["https://movies.example.com/movie/heat-1995/".to_string()]
/// );
/// ```
pub fn extract_item_urls(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse(ITEM_ANCHOR_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base_url.join(href.trim()) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!("Skipping unresolvable item link '{}': {}", href, e);
                None
            }
        })
        .collect()
}
