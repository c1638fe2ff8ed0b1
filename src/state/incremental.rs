//! Per-run incremental crawl state
//!
//! Makes re-runs incremental and idempotent: a persisted watermark date
//! lets the next run skip content it has already archived, and an in-run
//! seen-set deduplicates items that surface on multiple pages, sections,
//! or crawl phases within one run.

use crate::storage::{watermark_key, StateStore, StorageResult};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks watermark and dedup state for one crawl run of one scraper
///
/// Holds a handle to the shared state store; the watermark is read at run
/// start and written back at most once at run end. Not safe to share
/// across concurrent crawls of the same scraper.
pub struct IncrementalCrawlState {
    scraper: String,
    store: Arc<Mutex<dyn StateStore>>,

    /// Newest publication date observed this run, `YYYY-MM-DD`
    newest_observed_date: Option<String>,

    /// Item URLs already handled somewhere in this run
    session_seen_urls: HashSet<String>,
}

impl IncrementalCrawlState {
    /// Creates run state for the named scraper backed by the given store
    pub fn new(scraper: impl Into<String>, store: Arc<Mutex<dyn StateStore>>) -> Self {
        Self {
            scraper: scraper.into(),
            store,
            newest_observed_date: None,
            session_seen_urls: HashSet::new(),
        }
    }

    /// Reads the persisted watermark for this scraper
    ///
    /// Absent on the first-ever run, which means "crawl everything".
    pub fn get_last_scrape_date(&self) -> StorageResult<Option<String>> {
        let store = self.store.lock().unwrap();
        store.get(&watermark_key(&self.scraper))
    }

    /// Observes an item's publication date
    ///
    /// Keeps the maximum date seen so far; ISO `YYYY-MM-DD` strings order
    /// lexicographically, so plain string comparison is the date
    /// comparison. Call for every item considered, not only accepted ones,
    /// so the watermark advances even on a run that excludes everything.
    pub fn track_article_date(&mut self, date: Option<&str>) {
        if let Some(date) = date {
            let newer = match &self.newest_observed_date {
                Some(current) => date > current.as_str(),
                None => true,
            };
            if newer {
                self.newest_observed_date = Some(date.to_string());
            }
        }
    }

    /// Newest publication date observed so far this run
    pub fn newest_observed_date(&self) -> Option<&str> {
        self.newest_observed_date.as_deref()
    }

    /// Persists the watermark and flushes the store
    ///
    /// Writes `explicit_date` if given, else the newest observed date, else
    /// today. Call exactly once at run end, and only when the run finished
    /// completed or partial; a fully failed run must leave the watermark
    /// where it was so the retry re-covers the same ground.
    ///
    /// # Returns
    ///
    /// The date that was persisted.
    pub fn update_last_scrape_date(&mut self, explicit_date: Option<&str>) -> StorageResult<String> {
        let date = explicit_date
            .map(|d| d.to_string())
            .or_else(|| self.newest_observed_date.clone())
            .unwrap_or_else(today);

        let mut store = self.store.lock().unwrap();
        store.set(&watermark_key(&self.scraper), &date)?;
        store.flush()?;

        tracing::debug!(
            "Watermark for '{}' advanced to {}",
            self.scraper,
            date
        );
        Ok(date)
    }

    /// Returns true if the item was already handled somewhere in this run
    pub fn is_duplicate_in_session(&self, id: &str) -> bool {
        self.session_seen_urls.contains(id)
    }

    /// Marks an item as handled for the rest of this run
    pub fn mark_seen_in_session(&mut self, id: impl Into<String>) {
        self.session_seen_urls.insert(id.into());
    }

    /// Number of distinct items handled this run
    pub fn session_seen_count(&self) -> usize {
        self.session_seen_urls.len()
    }
}

/// Today's date as `YYYY-MM-DD`
fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunResult;
    use crate::storage::{MemoryStore, RunRecord, StorageError};

    fn shared_store() -> Arc<Mutex<dyn StateStore>> {
        Arc::new(Mutex::new(MemoryStore::new()))
    }

    #[test]
    fn test_first_run_has_no_watermark() {
        let state = IncrementalCrawlState::new("aemo", shared_store());
        assert_eq!(state.get_last_scrape_date().unwrap(), None);
    }

    #[test]
    fn test_newest_observed_date_is_monotonic() {
        let mut state = IncrementalCrawlState::new("aemo", shared_store());

        state.track_article_date(Some("2025-01-01"));
        state.track_article_date(Some("2025-03-01"));
        state.track_article_date(Some("2025-02-01"));

        assert_eq!(state.newest_observed_date(), Some("2025-03-01"));
    }

    #[test]
    fn test_track_ignores_absent_dates() {
        let mut state = IncrementalCrawlState::new("aemo", shared_store());

        state.track_article_date(None);
        assert_eq!(state.newest_observed_date(), None);

        state.track_article_date(Some("2025-01-01"));
        state.track_article_date(None);
        assert_eq!(state.newest_observed_date(), Some("2025-01-01"));
    }

    #[test]
    fn test_update_persists_newest_observed() {
        let store = shared_store();
        let mut state = IncrementalCrawlState::new("aemo", Arc::clone(&store));

        state.track_article_date(Some("2025-03-01"));
        let persisted = state.update_last_scrape_date(None).unwrap();
        assert_eq!(persisted, "2025-03-01");

        // Visible to a fresh state instance for the same scraper
        let next_run = IncrementalCrawlState::new("aemo", store);
        assert_eq!(
            next_run.get_last_scrape_date().unwrap(),
            Some("2025-03-01".to_string())
        );
    }

    #[test]
    fn test_update_prefers_explicit_date() {
        let mut state = IncrementalCrawlState::new("aemo", shared_store());

        state.track_article_date(Some("2025-03-01"));
        let persisted = state.update_last_scrape_date(Some("2025-06-30")).unwrap();
        assert_eq!(persisted, "2025-06-30");
    }

    #[test]
    fn test_update_falls_back_to_today() {
        let mut state = IncrementalCrawlState::new("aemo", shared_store());

        // No dated items observed this run
        let persisted = state.update_last_scrape_date(None).unwrap();
        assert_eq!(persisted, today());
    }

    #[test]
    fn test_update_flushes_store() {
        let store = Arc::new(Mutex::new(MemoryStore::new()));
        let dyn_store: Arc<Mutex<dyn StateStore>> = store.clone();
        let mut state = IncrementalCrawlState::new("aemo", dyn_store);

        state.update_last_scrape_date(Some("2025-01-01")).unwrap();
        assert_eq!(store.lock().unwrap().flush_count(), 1);
    }

    #[test]
    fn test_session_dedup() {
        let mut state = IncrementalCrawlState::new("aemo", shared_store());

        assert!(!state.is_duplicate_in_session("https://example.com/a"));
        state.mark_seen_in_session("https://example.com/a");
        assert!(state.is_duplicate_in_session("https://example.com/a"));
        assert!(!state.is_duplicate_in_session("https://example.com/b"));
        assert_eq!(state.session_seen_count(), 1);
    }

    #[test]
    fn test_watermarks_are_namespaced_per_scraper() {
        let store = shared_store();

        let mut aemo = IncrementalCrawlState::new("aemo", Arc::clone(&store));
        aemo.update_last_scrape_date(Some("2025-03-01")).unwrap();

        let aer = IncrementalCrawlState::new("aer", store);
        assert_eq!(aer.get_last_scrape_date().unwrap(), None);
    }

    /// Store whose writes always fail, for persistence-failure semantics
    struct FailingStore;

    impl StateStore for FailingStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Database("disk full".to_string()))
        }

        fn delete(&mut self, _key: &str) -> StorageResult<()> {
            Ok(())
        }

        fn flush(&mut self) -> StorageResult<()> {
            Ok(())
        }

        fn record_run(
            &mut self,
            _scraper: &str,
            _config_hash: Option<&str>,
            _result: &RunResult,
        ) -> StorageResult<i64> {
            Ok(0)
        }

        fn get_latest_run(&self, _scraper: &str) -> StorageResult<Option<RunRecord>> {
            Ok(None)
        }

        fn recent_runs(&self, _limit: u32) -> StorageResult<Vec<RunRecord>> {
            Ok(Vec::new())
        }

        fn list_watermarks(&self) -> StorageResult<Vec<(String, String)>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_update_surfaces_write_failure() {
        let store: Arc<Mutex<dyn StateStore>> = Arc::new(Mutex::new(FailingStore));
        let mut state = IncrementalCrawlState::new("aemo", store);

        let result = state.update_last_scrape_date(Some("2025-01-01"));
        assert!(result.is_err());
    }
}
