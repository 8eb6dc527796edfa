//! Verse index → page arithmetic.
//!
//! Indices are 0-based (`verse_number - 1`), pages are 1-based.  The page
//! size is fixed for the lifetime of one reading session.

use std::ops::Range;

/// Fixed page size of the paginated verse source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    items_per_page: u32,
}

/// Where a single index sits inside its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    pub page: u32,
    pub is_first_in_page: bool,
    pub is_last_in_page: bool,
}

impl Paging {
    /// A page size of zero is bumped to one.
    pub fn new(items_per_page: u32) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn items_per_page(self) -> u32 {
        self.items_per_page
    }

    /// `floor(index / items_per_page) + 1`.
    pub fn page_of(self, index: u32) -> u32 {
        index / self.items_per_page + 1
    }

    /// Page plus boundary flags for `index`.
    ///
    /// With a page size of one every item is both first and last of its page.
    pub fn position(self, index: u32) -> PagePosition {
        let rem = index % self.items_per_page;
        PagePosition {
            page: self.page_of(index),
            is_first_in_page: rem == 0,
            is_last_in_page: rem == self.items_per_page - 1,
        }
    }

    /// Number of pages needed to hold `total_items`.
    pub fn page_count(self, total_items: u32) -> u32 {
        total_items.div_ceil(self.items_per_page)
    }

    /// Index range covered by `page` (not clipped to the item count).
    pub fn index_range(self, page: u32) -> Range<u32> {
        let page = page.max(1);
        let start = (page - 1).saturating_mul(self.items_per_page);
        start..start.saturating_add(self.items_per_page)
    }
}
