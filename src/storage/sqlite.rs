//! SQLite state-store implementation
//!
//! This module provides a SQLite-based implementation of the StateStore trait.

use crate::run::{RunResult, RunStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StateStore, StorageResult};
use crate::storage::{join_errors, split_errors, RunRecord, WATERMARK_SUFFIX};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite state-store backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_run_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            scraper: row.get(1)?,
            finished_at: row.get(2)?,
            status: RunStatus::from_db_string(&row.get::<_, String>(3)?)
                .unwrap_or(RunStatus::Failed),
            config_hash: row.get(4)?,
            scraped_count: row.get::<_, i64>(5)? as u64,
            downloaded_count: row.get::<_, i64>(6)? as u64,
            skipped_count: row.get::<_, i64>(7)? as u64,
            excluded_count: row.get::<_, i64>(8)? as u64,
            failed_count: row.get::<_, i64>(9)? as u64,
            errors: split_errors(&row.get::<_, String>(10)?),
        })
    }
}

const RUN_COLUMNS: &str = "id, scraper, finished_at, status, config_hash, \
     scraped, downloaded, skipped, excluded, failed, errors";

impl StateStore for SqliteStore {
    // ===== Key-Value State =====

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM scraper_state WHERE key = ?1")?;
        let value = stmt.query_row(params![key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO scraper_state (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM scraper_state WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        // Writes go straight to the WAL; checkpoint it so state survives
        // an unclean shutdown of the host process.
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    // ===== Run History =====

    fn record_run(
        &mut self,
        scraper: &str,
        config_hash: Option<&str>,
        result: &RunResult,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (scraper, finished_at, status, config_hash,
                               scraped, downloaded, skipped, excluded, failed, errors)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                scraper,
                now,
                result.status.to_db_string(),
                config_hash,
                result.scraped_count as i64,
                result.downloaded_count as i64,
                result.skipped_count as i64,
                result.excluded_count as i64,
                result.failed_count as i64,
                join_errors(&result.errors),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_run(&self, scraper: &str) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs WHERE scraper = ?1 ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        ))?;
        let run = stmt
            .query_row(params![scraper], Self::row_to_run_record)
            .optional()?;
        Ok(run)
    }

    fn recent_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit], Self::row_to_run_record)?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }

    // ===== Watermark Inventory =====

    fn list_watermarks(&self) -> StorageResult<Vec<(String, String)>> {
        let pattern = format!("%{}", WATERMARK_SUFFIX);
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM scraper_state WHERE key LIKE ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![pattern], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut watermarks = Vec::new();
        for row in rows {
            let (key, value) = row?;
            let scraper = key
                .strip_suffix(WATERMARK_SUFFIX)
                .unwrap_or(key.as_str())
                .to_string();
            watermarks.push((scraper, value));
        }
        Ok(watermarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunResultAggregator;

    fn sample_result() -> RunResult {
        let mut agg = RunResultAggregator::new();
        agg.record_scraped();
        agg.record_scraped();
        agg.record_downloaded();
        agg.record_skipped();
        agg.finish()
    }

    #[test]
    fn test_kv_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        assert_eq!(store.get("aemo/last_scrape_date").unwrap(), None);

        store.set("aemo/last_scrape_date", "2025-03-01").unwrap();
        assert_eq!(
            store.get("aemo/last_scrape_date").unwrap(),
            Some("2025-03-01".to_string())
        );

        // Overwrite
        store.set("aemo/last_scrape_date", "2025-04-01").unwrap();
        assert_eq!(
            store.get("aemo/last_scrape_date").unwrap(),
            Some("2025-04-01".to_string())
        );
    }

    #[test]
    fn test_delete() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.set("k", "v").unwrap();
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        // Deleting an absent key is not an error
        store.delete("k").unwrap();
    }

    #[test]
    fn test_record_and_fetch_runs() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let result = sample_result();
        let id1 = store.record_run("aemo", Some("abc123"), &result).unwrap();
        let id2 = store.record_run("aer", None, &result).unwrap();
        assert!(id2 > id1);

        let latest = store.get_latest_run("aemo").unwrap().unwrap();
        assert_eq!(latest.scraper, "aemo");
        assert_eq!(latest.status, RunStatus::Completed);
        assert_eq!(latest.config_hash, Some("abc123".to_string()));
        assert_eq!(latest.scraped_count, 2);
        assert_eq!(latest.downloaded_count, 1);
        assert!(latest.errors.is_empty());

        assert!(store.get_latest_run("unknown").unwrap().is_none());

        let recent = store.recent_runs(10).unwrap();
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].scraper, "aer");
    }

    #[test]
    fn test_errors_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        let mut agg = RunResultAggregator::new();
        agg.record_error("timeout on page 3");
        agg.record_error("watermark write failed");
        let result = agg.finish();

        store.record_run("aemo", None, &result).unwrap();

        let latest = store.get_latest_run("aemo").unwrap().unwrap();
        assert_eq!(
            latest.errors,
            vec![
                "timeout on page 3".to_string(),
                "watermark write failed".to_string()
            ]
        );
        assert_eq!(latest.status, RunStatus::Failed);
    }

    #[test]
    fn test_list_watermarks() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store.set("aer/last_scrape_date", "2025-02-10").unwrap();
        store.set("aemo/last_scrape_date", "2025-03-01").unwrap();
        store.set("aemo/unrelated", "x").unwrap();

        let watermarks = store.list_watermarks().unwrap();
        assert_eq!(
            watermarks,
            vec![
                ("aemo".to_string(), "2025-03-01".to_string()),
                ("aer".to_string(), "2025-02-10".to_string()),
            ]
        );
    }
}
