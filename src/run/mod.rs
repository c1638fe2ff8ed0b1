//! Run result aggregation and status derivation

mod aggregator;

pub use aggregator::RunResultAggregator;

use std::fmt;

/// Final status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Every item processed with no recorded errors
    Completed,

    /// Errors occurred but at least one document was downloaded
    Partial,

    /// Errors occurred and nothing was downloaded
    Failed,

    /// The run was cancelled externally; overrides counter-derived status
    Cancelled,
}

impl RunStatus {
    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if a run with this status may advance the persisted
    /// watermark
    ///
    /// A fully failed run must not advance the watermark; otherwise the
    /// retry would silently skip the content this run missed.
    pub fn advances_watermark(&self) -> bool {
        matches!(self, Self::Completed | Self::Partial)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// A document rejected by the exclusion policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedDocument {
    pub title: Option<String>,
    pub url: String,
    pub reason: String,
}

/// Aggregated outcome of one crawl run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub status: RunStatus,
    pub scraped_count: u64,
    pub downloaded_count: u64,
    pub skipped_count: u64,
    pub excluded_count: u64,
    pub failed_count: u64,
    pub errors: Vec<String>,
    pub excluded: Vec<ExcludedDocument>,
}
