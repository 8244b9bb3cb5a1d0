//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PersistentCache trait.

use crate::state::{PageRecord, PageStatus, PageStore};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PersistentCache, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::WalkerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, identity, started_at, finished_at, config_hash, status, \
                           start_page, stop_page, last_page, halted_at";

/// SQLite page cache
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Opens or creates the cache database at `path`
    pub fn open(path: &Path) -> Result<Self, WalkerError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, WalkerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Lists every comic identity known to the cache
    pub fn identities(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT identity FROM comics ORDER BY identity")?;

        let identities = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(identities)
    }

    fn upsert_comic(conn: &Connection, identity: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO comics (identity, updated_at) VALUES (?1, ?2)
             ON CONFLICT(identity) DO UPDATE SET updated_at = excluded.updated_at",
            params![identity, now],
        )?;
        Ok(())
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    let status: String = row.get(5)?;
    let fetched_at: String = row.get(6)?;

    Ok(PageRecord {
        number: row.get(0)?,
        source_url: row.get(1)?,
        next_page_url: row.get(2)?,
        image_url: row.get(3)?,
        title: row.get(4)?,
        status: PageStatus::from_db_string(&status).unwrap_or(PageStatus::Unlinked),
        fetched_at: fetched_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        identity: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        start_page: row.get(6)?,
        stop_page: row.get(7)?,
        last_page: row.get(8)?,
        halted_at: row.get(9)?,
    })
}

impl PersistentCache for SqliteCache {
    // ===== Page Stores =====

    fn load(&self, identity: &str) -> StorageResult<Option<PageStore>> {
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM comics WHERE identity = ?1",
                params![identity],
                |row| row.get(0),
            )
            .optional()?;

        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT number, source_url, next_page_url, image_url, title, status, fetched_at
             FROM pages WHERE identity = ?1 ORDER BY number",
        )?;

        let store = stmt
            .query_map(params![identity], page_from_row)?
            .collect::<Result<PageStore, _>>()?;

        Ok(Some(store))
    }

    fn save(&mut self, identity: &str, store: &PageStore) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        Self::upsert_comic(&tx, identity)?;
        tx.execute("DELETE FROM pages WHERE identity = ?1", params![identity])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO pages
                 (identity, number, source_url, next_page_url, image_url, title, status, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for record in store.iter() {
                stmt.execute(params![
                    identity,
                    record.number,
                    record.source_url,
                    record.next_page_url,
                    record.image_url,
                    record.title,
                    record.status.to_db_string(),
                    record.fetched_at.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn reset(&mut self, identity: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        Self::upsert_comic(&tx, identity)?;
        tx.execute("DELETE FROM pages WHERE identity = ?1", params![identity])?;
        tx.commit()?;
        Ok(())
    }

    // ===== Run Management =====

    fn begin_run(
        &mut self,
        identity: &str,
        config_hash: &str,
        start_page: u32,
        stop_page: Option<u32>,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (identity, started_at, config_hash, status, start_page, stop_page)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                identity,
                now,
                config_hash,
                RunStatus::Running.to_db_string(),
                start_page,
                stop_page
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        last_page: Option<u32>,
        halted_at: Option<u32>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, last_page = ?3, halted_at = ?4
             WHERE id = ?5",
            params![status.to_db_string(), now, last_page, halted_at, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn latest_run(&self, identity: &str) -> StorageResult<Option<RunRecord>> {
        let sql = format!(
            "SELECT {} FROM runs WHERE identity = ?1 ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        );
        let run = self
            .conn
            .query_row(&sql, params![identity], run_from_row)
            .optional()?;
        Ok(run)
    }
}
