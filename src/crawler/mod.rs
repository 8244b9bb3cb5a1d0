//! Crawler module for walking a comic page by page
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-request timeouts
//! - The sequential walk with its URL fallback chain
//! - Overall scrape coordination (walk, download, save)

mod coordinator;
mod fetcher;
mod walker;

pub use coordinator::{run_scrape, ScrapeReport, Scraper};
pub use fetcher::{build_http_client, fetch_image, fetch_page, user_agent_string, FetchResult};
pub use walker::{resolve_candidates, CrawlOutcome, CrawlReport, Crawler};
