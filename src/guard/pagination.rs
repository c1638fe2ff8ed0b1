//! Pagination stopping-condition guard
//!
//! Real-world listing pages misbehave: some servers echo the final page for
//! any out-of-range page number, some return shifted windows that overlap
//! earlier pages without being identical, and some return empty markup once
//! the listing is exhausted. Any single stop signal either loops forever or
//! stops early on at least one of those, so the guard tracks three
//! independent consecutive-page streaks and stops when any of them reaches
//! its threshold.

use crate::config::GuardConfig;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Why the guard decided the crawl should stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// N consecutive pages contained no items at all
    EmptyPages(u32),

    /// N consecutive pages were exact duplicates of pages already seen
    DuplicatePages(u32),

    /// N consecutive pages contained no previously-unseen items
    NoNewItems(u32),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPages(n) => write!(f, "{} consecutive empty pages", n),
            Self::DuplicatePages(n) => write!(f, "{} consecutive duplicate pages", n),
            Self::NoNewItems(n) => {
                write!(f, "{} consecutive pages with no new items", n)
            }
        }
    }
}

/// Per-page decision returned by [`PaginationGuard::check_page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageVerdict {
    /// Keep fetching pages
    Continue,

    /// Stop paginating for the stated reason
    Stop(StopReason),
}

impl PageVerdict {
    /// Returns true if the driving loop should stop fetching pages
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

/// Tracks page-level stop signals across one crawl of one scraper
///
/// The guard is fed the item URLs found on each fetched page, strictly in
/// page-fetch order, and answers whether pagination should continue. State
/// is in-memory only and lives for a single crawl; it is not reused after
/// returning a stop verdict.
#[derive(Debug)]
pub struct PaginationGuard {
    config: GuardConfig,

    /// Every item URL observed on any page so far this crawl
    seen_urls: HashSet<String>,

    /// Unordered fingerprints of every distinct page seen so far
    seen_page_fingerprints: HashSet<BTreeSet<String>>,

    empty_streak: u32,
    duplicate_streak: u32,
    no_new_streak: u32,
}

impl PaginationGuard {
    /// Creates a guard with the given thresholds
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            seen_urls: HashSet::new(),
            seen_page_fingerprints: HashSet::new(),
            empty_streak: 0,
            duplicate_streak: 0,
            no_new_streak: 0,
        }
    }

    /// Checks one fetched page and decides whether pagination should continue
    ///
    /// Must be called once per page, in fetch order. Duplicate URLs within
    /// a single page list are tolerated; the fingerprint is a set, so they
    /// collapse silently.
    pub fn check_page(&mut self, item_urls: &[String]) -> PageVerdict {
        // Empty pages reset the other two streaks: an empty page says
        // nothing about duplication or staleness.
        if item_urls.is_empty() {
            self.empty_streak += 1;
            self.duplicate_streak = 0;
            self.no_new_streak = 0;

            if self.empty_streak >= self.config.max_empty_pages {
                return PageVerdict::Stop(StopReason::EmptyPages(self.empty_streak));
            }
            return PageVerdict::Continue;
        }

        self.empty_streak = 0;

        // Order-independent page identity: two pages with the same items in
        // any order are the same page.
        let fingerprint: BTreeSet<String> = item_urls.iter().cloned().collect();

        if self.seen_page_fingerprints.contains(&fingerprint) {
            // A duplicate page trivially contains no new items, so it
            // advances both streaks.
            self.duplicate_streak += 1;
            self.no_new_streak += 1;

            if self.duplicate_streak >= self.config.max_duplicate_pages {
                return PageVerdict::Stop(StopReason::DuplicatePages(self.duplicate_streak));
            }
            if self.no_new_streak >= self.config.max_no_new_items_pages {
                return PageVerdict::Stop(StopReason::NoNewItems(self.no_new_streak));
            }
            return PageVerdict::Continue;
        }

        self.duplicate_streak = 0;
        self.seen_page_fingerprints.insert(fingerprint);

        // A novel fingerprint can still be stale: shifted windows overlap
        // previously-seen content without being byte-identical.
        let has_new = item_urls.iter().any(|url| !self.seen_urls.contains(url));

        if !has_new {
            self.no_new_streak += 1;
            if self.no_new_streak >= self.config.max_no_new_items_pages {
                return PageVerdict::Stop(StopReason::NoNewItems(self.no_new_streak));
            }
            return PageVerdict::Continue;
        }

        self.no_new_streak = 0;

        for url in item_urls {
            self.seen_urls.insert(url.clone());
        }

        PageVerdict::Continue
    }

    /// Number of distinct item URLs observed so far this crawl
    pub fn unique_item_count(&self) -> usize {
        self.seen_urls.len()
    }

    /// Number of distinct pages observed so far this crawl
    pub fn distinct_page_count(&self) -> usize {
        self.seen_page_fingerprints.len()
    }
}

impl Default for PaginationGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}
