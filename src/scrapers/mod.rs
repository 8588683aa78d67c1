pub mod catalog;
pub mod detail;
pub mod fetcher;
pub mod kijiji;
pub mod listing_page;
pub mod traits;
pub mod types;

pub use fetcher::HttpFetcher;
pub use kijiji::KijijiScraper;
pub use traits::ScraperTrait;
pub use types::SearchParams;
