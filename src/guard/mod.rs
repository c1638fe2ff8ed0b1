//! Pagination termination guard
//!
//! Decides, page by page, whether a paginated listing crawl should keep
//! requesting pages. Works across pagination schemes (offset fragments,
//! query-string pages, REST pagination headers, feed paging) because it
//! only ever sees the item URLs extracted from each page.

mod pagination;

pub use pagination::{PageVerdict, PaginationGuard, StopReason};
