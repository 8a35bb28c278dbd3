//! Page-based listing
//!
//! Pages are 1-indexed and hold a fixed number of rows. Repositories fetch one
//! row past the page to learn whether a next page exists without a COUNT.

/// Rows per page. Part of the public contract, not configurable.
pub const PAGE_SIZE: u32 = 3;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
}

impl Pagination {
    /// Create pagination, clamping page to a minimum of 1.
    pub fn new(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(PAGE_SIZE)
    }

    /// Rows returned to the client.
    pub fn limit(&self) -> u32 {
        PAGE_SIZE
    }

    /// Rows to request from storage: one extra to detect a following page.
    pub fn fetch_limit(&self) -> u32 {
        PAGE_SIZE + 1
    }
}

impl From<Option<u32>> for Pagination {
    fn from(page: Option<u32>) -> Self {
        Self::new(page.unwrap_or(1))
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Current page number
    pub page: u32,
    /// Whether the following page has at least one row
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page from a query that asked for `fetch_limit()` rows.
    pub fn from_overfetch(mut rows: Vec<T>, pagination: Pagination) -> Self {
        let limit = pagination.limit() as usize;
        let has_next = rows.len() > limit;
        rows.truncate(limit);

        Self {
            items: rows,
            page: pagination.page,
            has_next,
        }
    }

    /// Number of the next page, if there is one.
    pub fn next_page(&self) -> Option<u32> {
        self.has_next.then(|| self.page.saturating_add(1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            has_next: self.has_next,
        }
    }
}
