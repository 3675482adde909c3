//! Hyperlink extraction from fetched pages

use scraper::{Html, Selector};
use url::Url;

/// Extracts the hyperlinks of an HTML page as absolute URLs.
///
/// Relative hrefs are resolved against `base_url`. Links that cannot become
/// crawlable page URLs are dropped:
/// - `javascript:`, `mailto:`, `tel:`, and `data:` hrefs
/// - fragment-only hrefs (same-page anchors)
/// - anchors carrying the `download` attribute
/// - anything that does not resolve to an HTTP(S) URL
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    for scheme in ["javascript:", "mailto:", "tel:", "data:"] {
        if href.starts_with(scheme) {
            return None;
        }
    }

    let resolved = base_url.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}
