//! Storage traits and error types
//!
//! This module defines the trait interface for page cache backends and
//! associated error types.

use crate::state::PageStore;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persists one [`PageStore`] per comic identity across process runs
///
/// Implementations own their connection; dropping the cache closes it.
pub trait PersistentCache {
    // ===== Page Stores =====

    /// Loads the stored pages of a comic
    ///
    /// Returns None if the comic was never saved or reset.
    fn load(&self, identity: &str) -> StorageResult<Option<PageStore>>;

    /// Replaces the stored pages of a comic with `store`
    fn save(&mut self, identity: &str, store: &PageStore) -> StorageResult<()>;

    /// Replaces the stored pages of a comic with an empty store
    ///
    /// Other comics are left untouched.
    fn reset(&mut self, identity: &str) -> StorageResult<()>;

    // ===== Run Management =====

    /// Records the start of a scrape and returns its run ID
    fn begin_run(
        &mut self,
        identity: &str,
        config_hash: &str,
        start_page: u32,
        stop_page: Option<u32>,
    ) -> StorageResult<i64>;

    /// Marks a run as finished
    ///
    /// `halted_at` is the page whose fetch failed, if the walk stopped on one.
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        last_page: Option<u32>,
        halted_at: Option<u32>,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run for a comic
    fn latest_run(&self, identity: &str) -> StorageResult<Option<RunRecord>>;
}
