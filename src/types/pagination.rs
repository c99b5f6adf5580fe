//! Pagination types shared by list operations and the response envelope.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Positional window over a result set.
///
/// `skip` is applied before `take`. `None` means no offset / no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub take: Option<u64>,
    pub skip: Option<u64>,
}

impl PageWindow {
    /// Unbounded window.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(take: Option<u64>, skip: Option<u64>) -> Self {
        Self { take, skip }
    }

    pub fn take(take: u64) -> Self {
        Self {
            take: Some(take),
            skip: None,
        }
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }
}

/// Pagination query parameters (DRY - reusable across all list endpoints)
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Calculate offset for database query.
    ///
    /// Saturates at `i64::MAX`, the largest offset the engines accept; a
    /// page that far out is simply empty.
    pub fn offset(&self) -> u64 {
        self.page
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.limit())
            .min(i64::MAX as u64)
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.per_page.min(MAX_PAGE_SIZE)
    }

    /// Window to hand to the repository
    pub fn window(&self) -> PageWindow {
        PageWindow {
            take: Some(self.limit()),
            skip: Some(self.offset()),
        }
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of rows plus the metadata describing it.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata.
///
/// `total` is the number of matching rows before the page was cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub page_size: u64,
    pub total: u64,
}

impl PaginationMeta {
    pub fn total_pages(&self) -> u64 {
        if self.page_size > 0 {
            self.total.div_ceil(self.page_size)
        } else {
            0
        }
    }
}

impl<T> Paginated<T> {
    /// Create new paginated result
    pub fn new(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        Self {
            items,
            meta: PaginationMeta {
                current_page: params.page.max(1),
                page_size: params.limit(),
                total,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_skips_whole_pages() {
        let params = PaginationParams::new(3, 10);
        assert_eq!(params.window(), PageWindow::new(Some(10), Some(20)));
    }

    #[test]
    fn page_size_is_capped() {
        let params = PaginationParams::new(1, 10_000);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_zero_behaves_like_first_page() {
        let params = PaginationParams::new(0, 5);
        assert_eq!(params.offset(), 0);
        let page = Paginated::new(vec![1, 2], &params, 2);
        assert_eq!(page.meta.current_page, 1);
    }

    #[test]
    fn huge_page_number_saturates_offset() {
        let params = PaginationParams::new(u64::MAX, 20);
        assert_eq!(params.offset(), i64::MAX as u64);
        assert_eq!(params.window(), PageWindow::new(Some(20), Some(i64::MAX as u64)));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Paginated::new(vec!['a'; 5], &PaginationParams::new(1, 5), 11);
        assert_eq!(page.meta.total_pages(), 3);
    }
}
