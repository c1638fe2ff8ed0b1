use serde::Deserialize;

/// Main configuration structure for gridharvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
    #[serde(rename = "scraper", default)]
    pub scrapers: Vec<ScraperEntry>,
}

/// Pagination guard thresholds
///
/// Each threshold counts *consecutive* pages exhibiting the condition
/// before the guard tells the driving loop to stop.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Stop after this many consecutive empty pages
    #[serde(rename = "max-empty-pages", default = "default_max_empty_pages")]
    pub max_empty_pages: u32,

    /// Stop after this many consecutive exact-duplicate pages
    #[serde(
        rename = "max-duplicate-pages",
        default = "default_max_duplicate_pages"
    )]
    pub max_duplicate_pages: u32,

    /// Stop after this many consecutive pages with no previously-unseen items
    #[serde(
        rename = "max-no-new-items-pages",
        default = "default_max_no_new_items_pages"
    )]
    pub max_no_new_items_pages: u32,
}

fn default_max_empty_pages() -> u32 {
    2
}

fn default_max_duplicate_pages() -> u32 {
    2
}

fn default_max_no_new_items_pages() -> u32 {
    3
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_empty_pages: default_max_empty_pages(),
            max_duplicate_pages: default_max_duplicate_pages(),
            max_no_new_items_pages: default_max_no_new_items_pages(),
        }
    }
}

/// Document exclusion policy configuration
///
/// All comparisons are case-insensitive. Empty lists disable the
/// corresponding check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Tags a document must carry to be included (empty = no requirement)
    #[serde(rename = "required-tags", default)]
    pub required_tags: Vec<String>,

    /// Tags that exclude a document, unless a required tag is also present
    #[serde(rename = "excluded-tags", default)]
    pub excluded_tags: Vec<String>,

    /// Title keywords that exclude a document (substring match)
    #[serde(rename = "excluded-keywords", default)]
    pub excluded_keywords: Vec<String>,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Hard cap on pages fetched per run, independent of the guard
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    200
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite state database
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A named scraper whose crawl state lives in the shared database
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperEntry {
    /// Scraper name, used to namespace persisted watermarks
    pub name: String,

    /// Listing URL the site adapter paginates from
    #[serde(rename = "base-url")]
    pub base_url: String,
}
