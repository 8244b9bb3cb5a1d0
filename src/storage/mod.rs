//! Storage module for persisting walk state
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Saving and loading one page store per comic
//! - Resetting a single comic
//! - Run tracking, so an early halt can be told apart from a finished comic

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCache;
pub use traits::{PersistentCache, StorageError, StorageResult};

use crate::WalkerError;
use std::path::Path;

/// Opens (or creates) the page cache at `path`
pub fn open_cache(path: &Path) -> Result<SqliteCache, WalkerError> {
    SqliteCache::open(path)
}

/// Represents a scrape run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub identity: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub start_page: u32,
    pub stop_page: Option<u32>,
    pub last_page: Option<u32>,
    pub halted_at: Option<u32>,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The run is in progress, or the process died during it
    Running,
    /// The walk reached its stop page or the comic's last page
    Completed,
    /// The walk stopped because a page could not be fetched
    Halted,
    /// Downloading failed for at least one page
    Failed,
    /// The run was cancelled
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Halted => "halted",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "halted" => Some(Self::Halted),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}
