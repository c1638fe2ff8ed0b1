//! Crawl engine and site-adapter interfaces
//!
//! This module contains the generic driving loop that coordinates a crawl:
//! - Fetching listing pages through an [`ItemSource`]
//! - Filtering items through the exclusion policy
//! - Deduplicating against in-run and cross-run state
//! - Consulting the pagination guard after every page
//! - Aggregating per-item outcomes into a run result

mod engine;
mod source;

pub use engine::CrawlEngine;
pub use source::{CancelToken, Downloader, ItemSource, PageItem};
