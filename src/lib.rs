//! Comic-Walker: a resumable web comic walker
//!
//! This crate walks a paginated web comic page by page, following the "next"
//! link found on each page, remembers what it found in a SQLite cache and
//! downloads every page's image into a predictably named file.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Comic-Walker operations
#[derive(Debug, Error)]
pub enum WalkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Download worker failed: {0}")]
    Worker(String),

    #[error("Unknown site: {0}")]
    UnknownSite(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Comic-Walker operations
pub type Result<T> = std::result::Result<T, WalkerError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport, Crawler, ScrapeReport, Scraper};
pub use download::{partition, DownloadReport, Downloader};
pub use site::{site_by_name, PageContent, SiteAdapter};
pub use state::{PageRecord, PageStatus, PageStore};
pub use storage::{PersistentCache, SqliteCache};
