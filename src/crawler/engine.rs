//! Generic crawl driving loop
//!
//! The page-fetch → filter → guard → aggregate cycle, independent of any
//! particular site. A site adapter supplies an [`ItemSource`] and a
//! [`Downloader`]; the engine owns everything in between and produces the
//! final [`RunResult`].

use crate::config::Config;
use crate::crawler::{CancelToken, Downloader, ItemSource, PageItem};
use crate::filter::ExclusionPolicy;
use crate::guard::{PageVerdict, PaginationGuard};
use crate::run::{RunResult, RunResultAggregator, RunStatus};
use crate::state::IncrementalCrawlState;
use crate::storage::StateStore;
use crate::Result;
use std::sync::{Arc, Mutex};

/// Runs one crawl of one scraper
///
/// Single-threaded and sequential: one page at a time, one item at a
/// time. Consumed by [`CrawlEngine::run`]; a new engine is built for each
/// run.
pub struct CrawlEngine {
    scraper: String,
    policy: ExclusionPolicy,
    guard: PaginationGuard,
    state: IncrementalCrawlState,
    store: Arc<Mutex<dyn StateStore>>,
    max_pages: u32,
    dry_run: bool,
    config_hash: Option<String>,
    cancel: CancelToken,
}

impl CrawlEngine {
    /// Creates an engine for the named scraper
    ///
    /// Guard thresholds, filter policy, and the page cap come from the
    /// configuration; watermark and run history live in the shared store.
    pub fn new(scraper: impl Into<String>, config: &Config, store: Arc<Mutex<dyn StateStore>>) -> Self {
        let scraper = scraper.into();
        Self {
            policy: ExclusionPolicy::new(&config.filter),
            guard: PaginationGuard::new(config.guard.clone()),
            state: IncrementalCrawlState::new(scraper.clone(), Arc::clone(&store)),
            store,
            max_pages: config.crawl.max_pages,
            dry_run: false,
            config_hash: None,
            cancel: CancelToken::new(),
            scraper,
        }
    }

    /// Uses an externally held cancellation token
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Enables dry-run mode: accepted items are counted as skipped instead
    /// of downloaded, and no state is persisted
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Attaches the config hash recorded with the run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Runs the crawl to completion and returns the aggregated result
    ///
    /// Page loop per page index 0, 1, 2, ...: fetch the page, process each
    /// item, then consult the pagination guard. The loop ends on a guard
    /// stop, the page cap, a source error, or cancellation. A source error
    /// is recorded against the run rather than propagated, so the run
    /// still finishes with a status and whatever it managed to download.
    ///
    /// At the end, the watermark is persisted only when the status permits
    /// it; a watermark write failure is appended to the error list but
    /// never fails the run.
    pub fn run(
        mut self,
        source: &mut dyn ItemSource,
        downloader: &mut dyn Downloader,
    ) -> Result<RunResult> {
        let watermark = self.state.get_last_scrape_date()?;
        match &watermark {
            Some(date) => {
                tracing::info!("Starting crawl for '{}', watermark {}", self.scraper, date)
            }
            None => tracing::info!("Starting first crawl for '{}'", self.scraper),
        }

        let mut aggregator = RunResultAggregator::new();

        'pages: for page_index in 0..self.max_pages {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl for '{}' cancelled before page {}", self.scraper, page_index);
                aggregator.mark_cancelled();
                break;
            }

            let items = match source.fetch_page(page_index) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        "Page {} failed for '{}': {}",
                        page_index,
                        self.scraper,
                        e
                    );
                    aggregator.record_error(format!("page {}: {}", page_index, e));
                    break;
                }
            };

            tracing::debug!(
                "Page {} for '{}': {} items",
                page_index,
                self.scraper,
                items.len()
            );

            let page_urls: Vec<String> = items.iter().map(|item| item.url.clone()).collect();

            for item in &items {
                if self.cancel.is_cancelled() {
                    tracing::info!("Crawl for '{}' cancelled mid-page", self.scraper);
                    aggregator.mark_cancelled();
                    break 'pages;
                }
                self.process_item(item, watermark.as_deref(), &mut aggregator, downloader);
            }

            match self.guard.check_page(&page_urls) {
                PageVerdict::Stop(reason) => {
                    tracing::info!("Stopping pagination for '{}': {}", self.scraper, reason);
                    break;
                }
                PageVerdict::Continue => {}
            }

            if page_index + 1 == self.max_pages {
                tracing::info!(
                    "Page cap of {} reached for '{}'",
                    self.max_pages,
                    self.scraper
                );
            }
        }

        let status = aggregator.status();
        let mut watermark_write_failed = false;
        if status.advances_watermark() && !self.dry_run {
            if let Err(e) = self.state.update_last_scrape_date(None) {
                tracing::warn!("Watermark write failed for '{}': {}", self.scraper, e);
                aggregator.record_error(format!("failed to persist watermark: {}", e));
                watermark_write_failed = true;
            }
        }

        let mut result = aggregator.finish();

        // The crawl itself succeeded before the write was attempted, so a
        // watermark persistence failure is surfaced in the error list but
        // cannot fail the run on its own. It can still demote it to partial.
        if watermark_write_failed && result.status == RunStatus::Failed {
            result.status = RunStatus::Partial;
        }

        if !self.dry_run {
            let mut store = self.store.lock().unwrap();
            if let Err(e) = store.record_run(&self.scraper, self.config_hash.as_deref(), &result) {
                tracing::warn!("Failed to record run for '{}': {}", self.scraper, e);
            }
        }

        tracing::info!(
            "Crawl for '{}' finished {}: {} scraped, {} downloaded, {} skipped, {} excluded, {} failed",
            self.scraper,
            result.status,
            result.scraped_count,
            result.downloaded_count,
            result.skipped_count,
            result.excluded_count,
            result.failed_count
        );

        Ok(result)
    }

    /// Processes one listed item
    ///
    /// Order matters: the date is tracked for every item so the watermark
    /// advances even when everything else rejects it, then the exclusion
    /// policy, then in-run dedup, then the watermark cutoff, and only then
    /// the download.
    fn process_item(
        &mut self,
        item: &PageItem,
        watermark: Option<&str>,
        aggregator: &mut RunResultAggregator,
        downloader: &mut dyn Downloader,
    ) {
        aggregator.record_scraped();
        self.state.track_article_date(item.published.as_deref());

        if let Some(reason) = self.policy.evaluate(&item.tags, item.title.as_deref()) {
            tracing::debug!("Excluded {} ({})", item.url, reason);
            aggregator.record_excluded(item.title.clone(), item.url.clone(), reason);
            return;
        }

        if self.state.is_duplicate_in_session(&item.url) {
            tracing::trace!("Duplicate in session: {}", item.url);
            aggregator.record_skipped();
            return;
        }
        self.state.mark_seen_in_session(item.url.clone());

        if let (Some(published), Some(watermark)) = (item.published.as_deref(), watermark) {
            if published < watermark {
                tracing::trace!("Older than watermark: {} ({})", item.url, published);
                aggregator.record_skipped();
                return;
            }
        }

        if self.dry_run {
            aggregator.record_skipped();
            return;
        }

        match downloader.download(item) {
            Ok(()) => aggregator.record_downloaded(),
            Err(e) => {
                tracing::warn!("Download failed for {}: {}", item.url, e);
                aggregator.record_failed();
                aggregator.record_error(format!("{}: {}", item.url, e));
            }
        }
    }
}
