//! Gridharvest: the incremental crawl engine behind a fleet of
//! energy-sector document scrapers.
//!
//! Site adapters fetch pages and download documents; this crate owns the
//! decisions between those steps: when pagination should stop, which
//! documents are excluded by tag/keyword policy, which items were already
//! seen this run or in a previous run, and what the run as a whole amounted
//! to when it finished.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod guard;
pub mod output;
pub mod run;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for gridharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Source error for scraper '{scraper}': {message}")]
    Source { scraper: String, message: String },

    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for gridharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CancelToken, CrawlEngine, Downloader, ItemSource, PageItem};
pub use filter::ExclusionPolicy;
pub use guard::{PageVerdict, PaginationGuard, StopReason};
pub use run::{ExcludedDocument, RunResult, RunResultAggregator, RunStatus};
pub use state::IncrementalCrawlState;
