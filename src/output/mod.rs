//! Output module for scrape reports and statistics
//!
//! This module handles:
//! - The report printed at the end of a scrape
//! - Per-comic statistics read back from the cache

mod report;
pub mod stats;

pub use report::{describe_outcome, format_report, print_report};
pub use stats::{load_statistics, print_statistics, ComicStatistics};
