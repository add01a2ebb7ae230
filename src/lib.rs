pub mod common_scraper;
pub mod detail_scraper;
pub mod http;
pub mod images;
pub mod listing_scraper;
pub mod models;
pub mod output;
pub mod pagination;
pub mod parser;
pub mod tui;
