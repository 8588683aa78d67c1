//! Extraction of detail-page links from a category result page.

use crate::scrapers::catalog::BASE_URL;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use tracing::debug;

/// Class carried by paid placements mixed into organic results
const SPONSORED_CLASS: &str = "top-feature";
/// Everything from this marker on is click tracking
const TRACKING_MARKER: &str = "?src=";
const LISTING_ID_DIGITS: usize = 10;

fn container_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("div[data-ad-id]").expect("valid selector"))
}

fn has_listing_id(value: &str) -> bool {
    value
        .as_bytes()
        .windows(LISTING_ID_DIGITS)
        .any(|w| w.iter().all(u8::is_ascii_digit))
}

/// Absolute, tracking-free URLs of the organic listings on a result page, in document order
pub fn extract_listing_urls(html: &[u8]) -> Vec<String> {
    let document = Html::parse_document(&String::from_utf8_lossy(html));
    let mut urls = Vec::new();

    for container in document.select(container_selector()) {
        let element = container.value();

        if !element.attr("data-ad-id").is_some_and(has_listing_id) {
            continue;
        }
        if element.classes().any(|c| c == SPONSORED_CLASS) {
            debug!(id = ?element.attr("data-ad-id"), "Skipping sponsored listing");
            continue;
        }
        let Some(href) = element.attr("data-vip-url") else {
            debug!(id = ?element.attr("data-ad-id"), "Listing container without a link");
            continue;
        };

        let path = href.split(TRACKING_MARKER).next().unwrap_or(href);
        if path.starts_with("http://") || path.starts_with("https://") {
            urls.push(path.to_string());
        } else {
            urls.push(format!("{}{}", BASE_URL, path));
        }
    }

    urls
}

/// The listing id is the last path segment of its detail URL
pub fn listing_id_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_sponsored_container() {
        let html = r#"<html><body>
            <div class="search-item top-feature" data-ad-id="9999999999" data-vip-url="/v-apartments/toronto/promo/9999999999"></div>
            <div class="search-item regular-ad" data-ad-id="1111111111" data-vip-url="/v-apartments/toronto/organic/1111111111"></div>
        </body></html>"#;

        assert_eq!(
            extract_listing_urls(html.as_bytes()),
            vec!["http://www.kijiji.ca/v-apartments/toronto/organic/1111111111".to_string()]
        );
    }

    #[test]
    fn test_strips_tracking_suffix() {
        let html = r#"<div class="search-item" data-ad-id="1111111111" data-vip-url="/v-apartments/toronto/unit/1111111111?src=xyz"></div>"#;

        assert_eq!(
            extract_listing_urls(html.as_bytes()),
            vec!["http://www.kijiji.ca/v-apartments/toronto/unit/1111111111".to_string()]
        );
    }

    #[test]
    fn test_keeps_document_order_and_duplicates() {
        let html = r#"
            <div data-ad-id="3333333333" data-vip-url="/a/3333333333"></div>
            <div data-ad-id="1111111111" data-vip-url="/a/1111111111"></div>
            <div data-ad-id="3333333333" data-vip-url="/a/3333333333?src=again"></div>
        "#;

        assert_eq!(
            extract_listing_urls(html.as_bytes()),
            vec![
                "http://www.kijiji.ca/a/3333333333".to_string(),
                "http://www.kijiji.ca/a/1111111111".to_string(),
                "http://www.kijiji.ca/a/3333333333".to_string(),
            ]
        );
    }

    #[test]
    fn test_ignores_short_ids_and_missing_links() {
        let html = r#"
            <div data-ad-id="12345" data-vip-url="/a/12345"></div>
            <div data-ad-id="2222222222"></div>
            <div data-ad-id="4444444444" data-vip-url="/a/4444444444"></div>
        "#;

        assert_eq!(
            extract_listing_urls(html.as_bytes()),
            vec!["http://www.kijiji.ca/a/4444444444".to_string()]
        );
    }

    #[test]
    fn test_absolute_links_kept() {
        let html = r#"<div data-ad-id="5555555555" data-vip-url="https://www.kijiji.ca/a/5555555555?src=top"></div>"#;

        assert_eq!(
            extract_listing_urls(html.as_bytes()),
            vec!["https://www.kijiji.ca/a/5555555555".to_string()]
        );
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_listing_urls(b"<html></html>").is_empty());
    }

    #[test]
    fn test_listing_id_from_url() {
        assert_eq!(
            listing_id_from_url("http://www.kijiji.ca/v-apartments/toronto/unit/1111111111"),
            Some("1111111111")
        );
        assert_eq!(listing_id_from_url("http://www.kijiji.ca/a/"), None);
    }
}
