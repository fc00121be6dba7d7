//! Pagination utilities for the view pipeline
//!
//! Fixed-size pages, 1-based page numbers, and the navigation actions of the
//! pager control.

use std::ops::RangeInclusive;

use super::query::PageNav;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: usize,
    /// items per page
    pub per_page: usize,
}

impl Pagination {
    /// Number of pages for `total` rows; an empty set still has one page.
    pub fn page_count(total: usize, per_page: usize) -> usize {
        total.div_ceil(per_page.max(1)).max(1)
    }

    /// Clamp the page into `[1, page_count]` for `total` rows.
    pub fn clamp(self, total: usize) -> Self {
        let per_page = self.per_page.max(1);
        let pages = Self::page_count(total, per_page);
        Self { page: self.page.clamp(1, pages), per_page }
    }

    /// Half-open slice bounds of the current page, limited to `total`.
    pub fn bounds(self, total: usize) -> (usize, usize) {
        let start = (self.page.max(1) - 1).saturating_mul(self.per_page).min(total);
        let end = start.saturating_add(self.per_page).min(total);
        (start, end)
    }

    /// Page selected by a navigation action. `Next` may overshoot; the next
    /// clamp brings it back.
    pub fn navigate(self, nav: PageNav, page_count: usize) -> usize {
        match nav {
            PageNav::First => 1,
            PageNav::Prev => self.page.saturating_sub(1).max(1),
            PageNav::Next => self.page.saturating_add(1),
            PageNav::Last => page_count.max(1),
            PageNav::Page(n) => n,
        }
    }

    /// Page numbers shown around the current page, `radius` on each side.
    pub fn window(self, page_count: usize, radius: usize) -> RangeInclusive<usize> {
        let end = self.page.saturating_add(radius).min(page_count.max(1));
        let start = self.page.saturating_sub(radius).max(1).min(end);
        start..=end
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}
