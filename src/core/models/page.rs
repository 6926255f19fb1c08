//! Pagination for repository listings

use serde::{Deserialize, Serialize};

/// Default page size
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size a listing will honour
pub const MAX_LIMIT: usize = 500;

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total matching items across all pages
    pub total: usize,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
}

impl<T> Page<T> {
    /// Slice a full, already-filtered result set into a page.
    ///
    /// `page` is 1-based; zero is treated as the first page. `limit` is
    /// clamped into `1..=MAX_LIMIT`.
    #[must_use]
    pub fn paginate(all: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_LIMIT);
        let total = all.len();
        let items = all.into_iter().skip((page - 1) * limit).take(limit).collect();
        Self {
            items,
            total,
            page,
            limit,
        }
    }

    /// Whether more pages follow this one
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page * self.limit < self.total
    }
}
