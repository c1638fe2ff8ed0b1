//! Incremental crawl state
//!
//! Watermark tracking and in-run deduplication that make repeated crawls
//! of the same site cheap: only content newer than the last successful
//! run is fetched again.

mod incremental;

pub use incremental::IncrementalCrawlState;
