//! Statistics generation from the page cache
//!
//! This module provides functionality for extracting and displaying
//! per-comic statistics from the storage layer.

use crate::state::{PageStatus, PageStore};
use crate::storage::{PersistentCache, RunRecord};
use crate::WalkerError;
use std::collections::HashMap;

/// Stored state of one comic
#[derive(Debug, Clone)]
pub struct ComicStatistics {
    /// Base identity of the comic
    pub identity: String,

    /// Number of stored pages
    pub total_pages: usize,

    /// Count of pages by status
    pub pages_by_status: HashMap<PageStatus, usize>,

    /// Pages with an image URL
    pub resolved_pages: usize,

    /// Highest stored page number
    pub last_page: Option<u32>,

    /// Stored pages without an image URL
    pub missing_images: Vec<u32>,

    /// Most recent run for this comic
    pub latest_run: Option<RunRecord>,
}

impl ComicStatistics {
    /// Summarizes an in-memory store
    pub fn from_store(identity: &str, store: &PageStore, latest_run: Option<RunRecord>) -> Self {
        let mut pages_by_status = HashMap::new();
        for record in store.iter() {
            *pages_by_status.entry(record.status).or_insert(0) += 1;
        }

        Self {
            identity: identity.to_string(),
            total_pages: store.len(),
            pages_by_status,
            resolved_pages: store.satisfied_count(),
            last_page: store.last_number(),
            missing_images: store
                .iter()
                .filter(|record| !record.is_satisfied())
                .map(|record| record.number)
                .collect(),
            latest_run,
        }
    }
}

/// Loads statistics for `identity` from the cache
///
/// A comic that was never saved yields empty statistics.
pub fn load_statistics(
    cache: &dyn PersistentCache,
    identity: &str,
) -> Result<ComicStatistics, WalkerError> {
    let store = cache.load(identity)?.unwrap_or_default();
    let latest_run = cache.latest_run(identity)?;
    Ok(ComicStatistics::from_store(identity, &store, latest_run))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ComicStatistics) {
    println!("=== Comic Statistics: {} ===\n", stats.identity);

    println!("Overview:");
    println!("  Stored pages: {}", stats.total_pages);
    match stats.last_page {
        Some(last) => println!("  Highest page: {}", last),
        None => println!("  Highest page: none"),
    }
    println!();

    println!("Pages by Status:");
    for status in PageStatus::all_statuses() {
        let count = stats.pages_by_status.get(&status).copied().unwrap_or(0);
        if count > 0 {
            println!("  {}: {}", status, count);
        }
    }
    println!();

    if !stats.missing_images.is_empty() {
        println!("Pages Without Image ({}):", stats.missing_images.len());
        for number in stats.missing_images.iter().take(20) {
            println!("  - {}", number);
        }
        if stats.missing_images.len() > 20 {
            println!("  ... and {} more", stats.missing_images.len() - 20);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  ID: {}", run.id);
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Status: {}", run.status.to_db_string());
        if let Some(last) = run.last_page {
            println!("  Reached page: {}", last);
        }
        if let Some(halted) = run.halted_at {
            println!("  Halted at page: {}", halted);
        }
        println!();
    }

    let resolved_rate = if stats.total_pages > 0 {
        (stats.resolved_pages as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Resolved: {:.1}% ({} / {} pages have an image)",
        resolved_rate, stats.resolved_pages, stats.total_pages
    );
}
