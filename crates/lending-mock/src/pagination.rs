//! Offset pagination for the users table.

use serde::Serialize;

use crate::error::PaginationError;

/// Page sizes the users table offers.
pub const PAGE_SIZE_CHOICES: [usize; 4] = [10, 20, 50, 100];

/// Page size used when none is requested.
pub const DEFAULT_PER_PAGE: usize = 10;

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    per_page: usize,
}

impl PageRequest {
    /// Creates a request for the 1-based `page` holding `per_page` items.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] if either value is zero.
    pub const fn new(page: usize, per_page: usize) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PaginationError::ZeroPerPage);
        }
        Ok(Self { page, per_page })
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    /// Slices `items` down to the requested page.
    ///
    /// A page beyond the last one is empty but still reports the totals.
    ///
    /// # Example
    ///
    /// ```
    /// use lending_mock::PageRequest;
    ///
    /// let request = PageRequest::new(2, 10).expect("valid request");
    /// let page = request.paginate((1..=25).collect::<Vec<_>>());
    ///
    /// assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
    /// assert_eq!(page.total_pages, 3);
    /// ```
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total_items = items.len();
        let start = self.page.saturating_sub(1).saturating_mul(self.per_page);
        let page_items = items.into_iter().skip(start).take(self.per_page).collect();

        Page {
            items: page_items,
            page: self.page,
            per_page: self.per_page,
            total_items,
            total_pages: total_items.div_ceil(self.per_page),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the totals needed to draw page links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in list order.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    /// Requested page size.
    pub per_page: usize,
    /// Items across all pages.
    pub total_items: usize,
    /// Number of pages, rounded up.
    pub total_pages: usize,
}
