//! Per-item outcome counters and final status derivation

use crate::run::{ExcludedDocument, RunResult, RunStatus};

/// Accumulates per-item outcomes across one crawl run
///
/// Counters only ever increase. The final status is derived from the
/// counters and error list when the run ends, except that cancellation is
/// an explicit override recorded by the driving loop.
#[derive(Debug, Default)]
pub struct RunResultAggregator {
    scraped_count: u64,
    downloaded_count: u64,
    skipped_count: u64,
    failed_count: u64,
    errors: Vec<String>,
    excluded: Vec<ExcludedDocument>,
    cancelled: bool,
}

impl RunResultAggregator {
    /// Creates an aggregator with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that an item was seen on a listing page
    pub fn record_scraped(&mut self) {
        self.scraped_count += 1;
    }

    /// Records a successful document download
    pub fn record_downloaded(&mut self) {
        self.downloaded_count += 1;
    }

    /// Records an item skipped as a duplicate or as older than the watermark
    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    /// Records an item rejected by the exclusion policy
    pub fn record_excluded(&mut self, title: Option<String>, url: String, reason: String) {
        self.excluded.push(ExcludedDocument { title, url, reason });
    }

    /// Records a failed download attempt
    pub fn record_failed(&mut self) {
        self.failed_count += 1;
    }

    /// Appends a message to the run's error list
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Marks the run as externally cancelled
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn scraped_count(&self) -> u64 {
        self.scraped_count
    }

    pub fn downloaded_count(&self) -> u64 {
        self.downloaded_count
    }

    pub fn skipped_count(&self) -> u64 {
        self.skipped_count
    }

    pub fn excluded_count(&self) -> u64 {
        self.excluded.len() as u64
    }

    pub fn failed_count(&self) -> u64 {
        self.failed_count
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Derives the run status from the current counters
    ///
    /// Cancellation wins outright. A run with errors and nothing downloaded
    /// is failed: even if some pages parsed cleanly, it is
    /// indistinguishable from total failure. A run that downloaded
    /// something despite errors is a partial success worth keeping.
    pub fn status(&self) -> RunStatus {
        if self.cancelled {
            RunStatus::Cancelled
        } else if !self.errors.is_empty() && self.downloaded_count == 0 {
            RunStatus::Failed
        } else if !self.errors.is_empty() {
            RunStatus::Partial
        } else {
            RunStatus::Completed
        }
    }

    /// Consumes the aggregator and produces the final run result
    pub fn finish(self) -> RunResult {
        let status = self.status();
        RunResult {
            status,
            scraped_count: self.scraped_count,
            downloaded_count: self.downloaded_count,
            skipped_count: self.skipped_count,
            excluded_count: self.excluded.len() as u64,
            failed_count: self.failed_count,
            errors: self.errors,
            excluded: self.excluded,
        }
    }
}
