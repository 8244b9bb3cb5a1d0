//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the page cache.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per comic that has been saved or reset
CREATE TABLE IF NOT EXISTS comics (
    identity TEXT PRIMARY KEY,
    updated_at TEXT NOT NULL
);

-- Stored page records, keyed by comic and page number
CREATE TABLE IF NOT EXISTS pages (
    identity TEXT NOT NULL REFERENCES comics(identity) ON DELETE CASCADE,
    number INTEGER NOT NULL,
    source_url TEXT NOT NULL,
    next_page_url TEXT,
    image_url TEXT,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    PRIMARY KEY (identity, number)
);

-- Track scrape runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    start_page INTEGER NOT NULL,
    stop_page INTEGER,
    last_page INTEGER,
    halted_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_runs_identity ON runs(identity);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
