//! Storage module for persisting crawl state
//!
//! This module handles persistence for the crawl engine, including:
//! - Per-scraper watermark storage (namespaced key-value entries)
//! - Run history recording and retrieval
//! - SQLite schema management
//! - An in-memory backend for tests and dry runs

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{StateStore, StorageError, StorageResult};

use crate::run::RunStatus;
use crate::HarvestError;
use std::path::Path;

/// Key suffix under which each scraper's watermark is stored
pub const WATERMARK_SUFFIX: &str = "/last_scrape_date";

/// Initializes or opens a state database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized storage
/// * `Err(HarvestError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStore, HarvestError> {
    SqliteStore::new(path)
}

/// Builds the watermark key for a scraper name
pub fn watermark_key(scraper: &str) -> String {
    format!("{}{}", scraper, WATERMARK_SUFFIX)
}

/// A recorded crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub scraper: String,
    pub finished_at: String,
    pub status: RunStatus,
    pub config_hash: Option<String>,
    pub scraped_count: u64,
    pub downloaded_count: u64,
    pub skipped_count: u64,
    pub excluded_count: u64,
    pub failed_count: u64,
    pub errors: Vec<String>,
}

impl RunRecord {
    /// Reconstructs the run result this record was built from
    ///
    /// Excluded-document details are not persisted, only their count, so
    /// the excluded list comes back empty.
    pub fn to_result(&self) -> crate::run::RunResult {
        crate::run::RunResult {
            status: self.status,
            scraped_count: self.scraped_count,
            downloaded_count: self.downloaded_count,
            skipped_count: self.skipped_count,
            excluded_count: self.excluded_count,
            failed_count: self.failed_count,
            errors: self.errors.clone(),
            excluded: Vec::new(),
        }
    }
}

/// Joins an error list into the single-column form stored in `runs.errors`
///
/// Messages are newline-separated; newlines and backslashes inside a
/// message are escaped so the split is lossless.
pub(crate) fn join_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| e.replace('\\', "\\\\").replace('\n', "\\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits the stored `runs.errors` column back into a list
pub(crate) fn split_errors(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        Vec::new()
    } else {
        joined.split('\n').map(unescape_error).collect()
    }
}

fn unescape_error(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermark_key() {
        assert_eq!(watermark_key("aemo"), "aemo/last_scrape_date");
    }

    #[test]
    fn test_run_record_to_result() {
        let record = RunRecord {
            id: 1,
            scraper: "aemo".to_string(),
            finished_at: "2025-08-01T00:00:00Z".to_string(),
            status: RunStatus::Partial,
            config_hash: None,
            scraped_count: 5,
            downloaded_count: 3,
            skipped_count: 1,
            excluded_count: 1,
            failed_count: 1,
            errors: vec!["boom".to_string()],
        };

        let result = record.to_result();
        assert_eq!(result.status, RunStatus::Partial);
        assert_eq!(result.scraped_count, 5);
        assert_eq!(result.excluded_count, 1);
        assert!(result.excluded.is_empty());
        assert_eq!(result.errors, vec!["boom".to_string()]);
    }

    #[test]
    fn test_error_join_split_roundtrip() {
        let errors = vec!["first".to_string(), "second".to_string()];
        assert_eq!(split_errors(&join_errors(&errors)), errors);

        assert_eq!(split_errors(""), Vec::<String>::new());
        assert_eq!(join_errors(&[]), "");
    }

    #[test]
    fn test_error_roundtrip_with_embedded_newlines() {
        // HTTP error bodies quoted into messages can carry newlines and
        // backslashes; they must come back as one entry, verbatim
        let errors = vec![
            "server said:\n<html>\nboom".to_string(),
            "path C:\\data\\x".to_string(),
            "trailing slash \\".to_string(),
        ];
        assert_eq!(split_errors(&join_errors(&errors)), errors);
    }
}
