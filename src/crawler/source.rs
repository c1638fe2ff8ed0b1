//! Interfaces between the engine and the per-site adapters
//!
//! Site adapters live out of tree: they know selectors, pagination URLs,
//! and download mechanics for one site. The engine only ever sees plain
//! values through these traits.

use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One crawlable item extracted from a listing page
///
/// The URL is the item's identity; equality is exact string match, and
/// adapters are responsible for canonicalizing URLs before handing them
/// over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItem {
    /// Canonical item URL
    pub url: String,

    /// Document title, when the listing exposes one
    pub title: Option<String>,

    /// Tags or categories attached to the document
    pub tags: Vec<String>,

    /// Publication date as `YYYY-MM-DD`, when known
    pub published: Option<String>,
}

impl PageItem {
    /// Creates an item with only a URL; metadata defaults to absent
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            tags: Vec::new(),
            published: None,
        }
    }
}

/// Supplies item listings one page at a time
///
/// `fetch_page` is called with increasing page indexes starting at 0 until
/// the engine decides to stop. Returning an empty list is a normal
/// outcome; returning an error ends the page loop and is recorded against
/// the run.
pub trait ItemSource {
    fn fetch_page(&mut self, page_index: u32) -> Result<Vec<PageItem>>;
}

/// Downloads one accepted item to the corpus
pub trait Downloader {
    fn download(&mut self, item: &PageItem) -> Result<()>;
}

/// Cooperative cancellation flag
///
/// Cloneable; the driving loop checks it between pages and between items.
/// Cancellation is not an error: the run finishes with cancelled status.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_page_item_new() {
        let item = PageItem::new("https://example.com/doc");
        assert_eq!(item.url, "https://example.com/doc");
        assert!(item.title.is_none());
        assert!(item.tags.is_empty());
        assert!(item.published.is_none());
    }
}
