//! Total page count discovery from the pagination indicator

use scraper::{Html, Selector};

/// Determines the number of listing pages from the first listing page
///
/// The site renders a `<span class="pages">Page 1 of 1,234</span>` indicator.
/// The integer after the last `of` is the page count, with thousands
/// separators removed.
///
/// Returns 1 when the indicator is missing or its trailing token is not a
/// positive integer: no pagination means a single page.
pub fn discover_total_pages(html: &str) -> u32 {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("span.pages") else {
        return 1;
    };

    let Some(element) = document.select(&selector).next() else {
        tracing::debug!("No pagination indicator found, assuming a single page");
        return 1;
    };

    let text = element.text().collect::<String>();
    let trailing = text.rsplit("of").next().unwrap_or_default();

    match trailing.trim().replace(',', "").parse::<u32>() {
        Ok(total) if total >= 1 => total,
        _ => {
            tracing::warn!("Unrecognized pagination text '{}', assuming a single page", text.trim());
            1
        }
    }
}
