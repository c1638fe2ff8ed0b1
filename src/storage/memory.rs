//! In-memory state store
//!
//! Backs dry runs and tests, where crawl state must not touch disk.

use crate::run::RunResult;
use crate::storage::traits::{StateStore, StorageResult};
use crate::storage::{RunRecord, WATERMARK_SUFFIX};
use chrono::Utc;
use std::collections::HashMap;

/// HashMap-backed state store with no durability
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    runs: Vec<RunRecord>,
    flush_count: u32,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `flush` has been called (for tests)
    pub fn flush_count(&self) -> u32 {
        self.flush_count
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.flush_count += 1;
        Ok(())
    }

    fn record_run(
        &mut self,
        scraper: &str,
        config_hash: Option<&str>,
        result: &RunResult,
    ) -> StorageResult<i64> {
        let id = self.runs.len() as i64 + 1;
        self.runs.push(RunRecord {
            id,
            scraper: scraper.to_string(),
            finished_at: Utc::now().to_rfc3339(),
            status: result.status,
            config_hash: config_hash.map(|h| h.to_string()),
            scraped_count: result.scraped_count,
            downloaded_count: result.downloaded_count,
            skipped_count: result.skipped_count,
            excluded_count: result.excluded_count,
            failed_count: result.failed_count,
            errors: result.errors.clone(),
        });
        Ok(id)
    }

    fn get_latest_run(&self, scraper: &str) -> StorageResult<Option<RunRecord>> {
        Ok(self
            .runs
            .iter()
            .rev()
            .find(|run| run.scraper == scraper)
            .cloned())
    }

    fn recent_runs(&self, limit: u32) -> StorageResult<Vec<RunRecord>> {
        Ok(self
            .runs
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn list_watermarks(&self) -> StorageResult<Vec<(String, String)>> {
        let mut watermarks: Vec<(String, String)> = self
            .entries
            .iter()
            .filter_map(|(key, value)| {
                key.strip_suffix(WATERMARK_SUFFIX)
                    .map(|scraper| (scraper.to_string(), value.clone()))
            })
            .collect();
        watermarks.sort();
        Ok(watermarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{RunResultAggregator, RunStatus};

    #[test]
    fn test_kv_roundtrip() {
        let mut store = MemoryStore::new();

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.delete("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_flush_counted() {
        let mut store = MemoryStore::new();
        store.flush().unwrap();
        store.flush().unwrap();
        assert_eq!(store.flush_count(), 2);
    }

    #[test]
    fn test_run_history() {
        let mut store = MemoryStore::new();
        let result = RunResultAggregator::new().finish();

        store.record_run("aemo", None, &result).unwrap();
        store.record_run("aer", None, &result).unwrap();

        let latest = store.get_latest_run("aemo").unwrap().unwrap();
        assert_eq!(latest.scraper, "aemo");
        assert_eq!(latest.status, RunStatus::Completed);

        let recent = store.recent_runs(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].scraper, "aer");
    }

    #[test]
    fn test_list_watermarks_sorted() {
        let mut store = MemoryStore::new();
        store.set("b/last_scrape_date", "2025-01-02").unwrap();
        store.set("a/last_scrape_date", "2025-01-01").unwrap();
        store.set("a/other", "x").unwrap();

        let watermarks = store.list_watermarks().unwrap();
        assert_eq!(
            watermarks,
            vec![
                ("a".to_string(), "2025-01-01".to_string()),
                ("b".to_string(), "2025-01-02".to_string()),
            ]
        );
    }
}
