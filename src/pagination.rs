//! Incremental "load more" pagination over an in-memory result list.

use serde::{Deserialize, Serialize};

/// Hotels revealed per page.
pub const PAGE_SIZE: usize = 6;

/// Tracks how much of a result list is displayed.
///
/// The displayed part is always a prefix of `min(total, page * page_size)`
/// items. Loading more recomputes that prefix instead of appending.
///
/// A stored paginator with a zero page or page size is rejected on
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredPaginator")]
pub struct Paginator {
    /// Length of the full result list.
    total: usize,
    /// Current page, starting at 1.
    page: usize,
    /// Items per page.
    page_size: usize,
}

/// Paginator fields as read back from storage, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPaginator {
    /// Length of the full result list.
    total: usize,
    /// Current page.
    page: usize,
    /// Items per page.
    page_size: usize,
}

impl TryFrom<StoredPaginator> for Paginator {
    type Error = &'static str;

    #[inline]
    fn try_from(stored: StoredPaginator) -> Result<Self, Self::Error> {
        if stored.page == 0 {
            return Err("page must be at least 1");
        }
        if stored.page_size == 0 {
            return Err("page size must be at least 1");
        }
        Ok(Self {
            total: stored.total,
            page: stored.page,
            page_size: stored.page_size,
        })
    }
}

impl Default for Paginator {
    #[inline]
    fn default() -> Self {
        Self::new(0)
    }
}

impl Paginator {
    /// Starts at page 1 over `total` items with [`PAGE_SIZE`].
    #[inline]
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self::with_page_size(total, PAGE_SIZE)
    }

    /// Starts at page 1 with a custom page size (at least 1).
    #[inline]
    #[must_use]
    pub const fn with_page_size(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page: 1,
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    /// Resets to page 1 for a new result list.
    #[inline]
    pub const fn reset(&mut self, total: usize) {
        self.total = total;
        self.page = 1;
    }

    /// Current page number.
    #[inline]
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Length of the full result list.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Number of items currently displayed.
    #[inline]
    #[must_use]
    pub const fn visible_len(&self) -> usize {
        let shown = self.page.saturating_mul(self.page_size);
        if shown < self.total { shown } else { self.total }
    }

    /// `true` while part of the list is still hidden.
    #[inline]
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.visible_len() < self.total
    }

    /// Reveals the next page.
    ///
    /// Returns `false` and changes nothing when everything is already
    /// displayed.
    #[inline]
    pub const fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.page = self.page.saturating_add(1);
        true
    }

    /// The displayed prefix of `items`.
    #[inline]
    #[must_use]
    pub fn visible<'items, T>(&self, items: &'items [T]) -> &'items [T] {
        items.get(..self.visible_len()).unwrap_or(items)
    }
}
