//! Storage traits and error types
//!
//! This module defines the trait interface for state-store backends and
//! associated error types.

use crate::run::RunResult;
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl-state store backends
///
/// The store carries two kinds of state: namespaced key-value entries
/// (watermarks, keyed `<scraper>/last_scrape_date`) and a run-history log.
/// Writes may be buffered until `flush` is called.
pub trait StateStore {
    // ===== Key-Value State =====

    /// Gets a value by key, or None if absent
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Sets a value, replacing any existing value for the key
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes a key; deleting an absent key is not an error
    fn delete(&mut self, key: &str) -> StorageResult<()>;

    /// Flushes buffered writes to durable storage
    fn flush(&mut self) -> StorageResult<()>;

    // ===== Run History =====

    /// Records a finished run for a scraper
    ///
    /// # Arguments
    ///
    /// * `scraper` - The scraper name
    /// * `config_hash` - Hash of the config file in effect, if known
    /// * `result` - The aggregated run result
    ///
    /// # Returns
    ///
    /// The ID of the newly recorded run
    fn record_run(
        &mut self,
        scraper: &str,
        config_hash: Option<&str>,
        result: &RunResult,
    ) -> StorageResult<i64>;

    /// Gets the most recent recorded run for a scraper
    fn get_latest_run(&self, scraper: &str) -> StorageResult<Option<RunRecord>>;

    /// Gets the most recent runs across all scrapers, newest first
    fn recent_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>>;

    // ===== Watermark Inventory =====

    /// Lists all persisted watermarks as (scraper, date) pairs
    fn list_watermarks(&self) -> StorageResult<Vec<(String, String)>>;
}
