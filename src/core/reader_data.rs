//! Initial reader payload: the pages lookup for a chapter plus the first
//! page of verses.

use std::collections::BTreeMap;

use super::page_map::VerseRecord;
use super::paging::Paging;

/// Inclusive verse-number bounds of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub from: u32,
    pub to: u32,
}

/// Which verses live on which page for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagesLookup {
    pub chapter: u32,
    pub total_pages: u32,
    pub pages: BTreeMap<u32, PageBounds>,
}

impl PagesLookup {
    pub fn for_chapter(chapter: u32, verse_count: u32, paging: Paging) -> Self {
        let total_pages = paging.page_count(verse_count);
        let pages = (1..=total_pages)
            .map(|page| {
                let range = paging.index_range(page);
                let bounds = PageBounds {
                    from: range.start + 1,
                    to: range.end.min(verse_count),
                };
                (page, bounds)
            })
            .collect();
        Self {
            chapter,
            total_pages,
            pages,
        }
    }

    pub fn bounds(&self, page: u32) -> Option<PageBounds> {
        self.pages.get(&page).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderMetadata {
    /// Number of verses delivered in the initial response.
    pub number_of_verses: usize,
}

/// Everything the reader needs before the first frame.
#[derive(Debug, Clone)]
pub struct ReaderData {
    pub verses: Vec<VerseRecord>,
    pub pages_lookup: PagesLookup,
    pub metadata: ReaderMetadata,
}

impl ReaderData {
    pub fn assemble(pages_lookup: PagesLookup, verses: Vec<VerseRecord>) -> Self {
        let metadata = ReaderMetadata {
            number_of_verses: verses.len(),
        };
        Self {
            verses,
            pages_lookup,
            metadata,
        }
    }
}
