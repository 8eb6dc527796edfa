//! The asynchronously populated page map.
//!
//! Pages are added by the data-fetching side and never removed.  The
//! reconciler only ever reads the map; what it keeps between passes is a
//! [`PageSnapshot`] of which page numbers were loaded.

use std::collections::{BTreeMap, BTreeSet};

use super::paging::Paging;

/// One verse as delivered by the paginated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRecord {
    pub chapter: u32,
    pub verse_number: u32,
    pub text: String,
}

impl VerseRecord {
    /// `"chapter:verse"`, e.g. `"2:255"`.
    pub fn verse_key(&self) -> String {
        format!("{}:{}", self.chapter, self.verse_number)
    }
}

/// Set of page numbers that were loaded at the end of a reconciliation pass.
pub type PageSnapshot = BTreeSet<u32>;

/// Page number → ordered verses of that page.
#[derive(Debug, Clone, Default)]
pub struct PageMap {
    pages: BTreeMap<u32, Vec<VerseRecord>>,
}

impl PageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page.  Returns `true` if this made the page loaded.
    ///
    /// Empty sequences never count as loaded, and an already loaded page is
    /// left untouched so the map only grows.
    pub fn insert_page(&mut self, page: u32, verses: Vec<VerseRecord>) -> bool {
        if page == 0 || verses.is_empty() || self.is_loaded(page) {
            return false;
        }
        self.pages.insert(page, verses);
        true
    }

    /// A page is loaded iff its key exists with a non-empty sequence.
    pub fn is_loaded(&self, page: u32) -> bool {
        self.pages.get(&page).is_some_and(|v| !v.is_empty())
    }

    pub fn page(&self, page: u32) -> Option<&[VerseRecord]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    /// Look up the verse at 0-based `index`, if its page is loaded.
    pub fn verse(&self, index: u32, paging: Paging) -> Option<&VerseRecord> {
        let page = self.page(paging.page_of(index))?;
        let offset = index - paging.index_range(paging.page_of(index)).start;
        page.get(offset as usize)
    }

    /// Snapshot of the currently loaded page numbers.
    pub fn snapshot(&self) -> PageSnapshot {
        self.pages
            .iter()
            .filter(|(_, verses)| !verses.is_empty())
            .map(|(&page, _)| page)
            .collect()
    }

    /// `true` iff `page` is loaded now but was absent from `previous`.
    pub fn is_newly_loaded(&self, previous: &PageSnapshot, page: u32) -> bool {
        !previous.contains(&page) && self.is_loaded(page)
    }

    pub fn loaded_page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn loaded_verse_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(chapter: u32, verses: std::ops::RangeInclusive<u32>) -> Vec<VerseRecord> {
        verses
            .map(|n| VerseRecord {
                chapter,
                verse_number: n,
                text: format!("verse {n}"),
            })
            .collect()
    }

    #[test]
    fn empty_pages_are_not_loaded() {
        let mut map = PageMap::new();
        assert!(!map.insert_page(1, Vec::new()));
        assert!(!map.is_loaded(1));
        assert!(map.snapshot().is_empty());
    }

    #[test]
    fn pages_are_never_replaced() {
        let mut map = PageMap::new();
        assert!(map.insert_page(2, page(1, 11..=20)));
        assert!(!map.insert_page(2, page(1, 1..=3)));
        assert_eq!(map.page(2).map(<[_]>::len), Some(10));
    }

    #[test]
    fn verse_lookup_uses_paging() {
        let mut map = PageMap::new();
        map.insert_page(2, page(3, 11..=20));
        let paging = Paging::new(10);

        assert_eq!(map.verse(14, paging).map(|v| v.verse_number), Some(15));
        assert_eq!(map.verse(3, paging), None);
        assert_eq!(map.verse(14, paging).map(VerseRecord::verse_key), Some("3:15".into()));
    }

    #[test]
    fn newly_loaded_diffs_against_snapshot() {
        let mut map = PageMap::new();
        map.insert_page(1, page(1, 1..=10));
        let before = map.snapshot();
        map.insert_page(3, page(1, 21..=30));

        assert!(!map.is_newly_loaded(&before, 1));
        assert!(map.is_newly_loaded(&before, 3));
        assert!(!map.is_newly_loaded(&before, 2));
        assert_eq!(map.loaded_verse_count(), 20);
    }
}
