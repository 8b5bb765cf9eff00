//! Page slicing and the paginated response envelope.

use serde::Serialize;

/// Largest offset or limit the database drivers can bind (a signed 64-bit integer).
const MAX_BOUND: u64 = i64::MAX as u64;

/// A validated page request. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub per_page: u64,
}

impl PageRequest {
    /// Create a page request, raising zero values to 1.
    #[must_use]
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Number of rows skipped before this page.
    ///
    /// Capped at `i64::MAX`; any page that far out is past the end.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.per_page);
        if offset > MAX_BOUND { MAX_BOUND } else { offset }
    }

    /// Maximum number of rows on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        if self.per_page > MAX_BOUND {
            MAX_BOUND
        } else {
            self.per_page
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Rows matching the query across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub per_page: u64,
    /// Number of pages needed for `total` rows.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page from its rows and the unsliced total.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total.div_ceil(request.per_page.max(1)),
        }
    }

    /// Map the rows, keeping the metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}
