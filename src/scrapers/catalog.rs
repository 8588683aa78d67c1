//! Category table and result-page URL construction.

use crate::scrapers::types::SearchParams;
use tracing::warn;

pub const BASE_URL: &str = "http://www.kijiji.ca";

/// Placeholder in a category path that receives the `page-N/` segment
const PAGE_SLOT: &str = "{page}";

/// Category label to URL path, with [`PAGE_SLOT`] marking where pagination goes
const CATEGORIES: &[(&str, &str)] = &[
    ("bc", "b-bachelor-studio-apartments-condos/city-of-toronto/{page}c211l1700273"),
    ("1b", "b-1-bedroom-apartments-condos/city-of-toronto/{page}c212l1700273"),
    ("1b+d", "b-1-bedroom-den-apartments-condos/city-of-toronto/{page}c213l1700273"),
    ("2b", "b-2-bedroom-apartments-condos/city-of-toronto/{page}c214l1700273"),
    ("3b", "b-3-bedroom-apartments-condos/city-of-toronto/{page}c215l1700273"),
    ("4b+", "b-4-plus-bedroom-apartments-condos/city-of-toronto/{page}c216l1700273"),
    ("hs", "b-house-rental/city-of-toronto/{page}c43l1700273"),
];

pub fn category_path(label: &str) -> Option<&'static str> {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, path)| *path)
}

pub fn known_categories() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|(name, _)| *name)
}

/// One result page to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub category: String,
    pub url: String,
}

/// Every (category, page) combination for the search, in category then page order.
/// Unknown categories are skipped.
pub fn build_page_requests(params: &SearchParams) -> Vec<PageRequest> {
    let mut requests = Vec::new();

    for category in &params.categories {
        let Some(path) = category_path(category) else {
            warn!(category = %category, "Unknown category, skipping");
            continue;
        };

        for page in 1..=params.max_pages {
            requests.push(PageRequest {
                category: category.clone(),
                url: page_url(path, page, params),
            });
        }
    }

    requests
}

fn page_url(path: &str, page: u32, params: &SearchParams) -> String {
    // The first page has no page segment at all
    let page_segment = if page == 1 {
        String::new()
    } else {
        format!("page-{}/", page)
    };

    format!(
        "{}/{}r{}?ad=offering&minNumberOfImages=2&price={}__{}&address={}&ll={},{}",
        BASE_URL,
        path.replace(PAGE_SLOT, &page_segment),
        params.radius_km,
        params.min_price,
        params.max_price,
        urlencoding::encode(&params.address),
        params.reference.latitude,
        params.reference.longitude,
    )
}
