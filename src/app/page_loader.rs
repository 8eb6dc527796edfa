//! Simulated paginated verse source and the background page fetches.
//!
//! Each page is fetched on its own task with a latency that varies per page,
//! so requests issued together complete out of order, the way independent
//! network requests do.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::trace;

use super::event::{AppEvent, EventSender};
use crate::core::page_map::VerseRecord;
use crate::core::paging::Paging;
use crate::core::reader_data::PagesLookup;

const WORDS: &[&str] = &[
    "and", "the", "mercy", "light", "of", "guidance", "those", "who", "believe", "in", "unseen",
    "establish", "prayer", "spend", "from", "what", "we", "have", "provided", "them", "heavens",
    "earth", "signs", "people", "reason", "remember", "patient", "grateful", "truth", "path",
];

/// Deterministic stand-in for the verse API of one chapter.
#[derive(Debug, Clone)]
pub struct VerseSource {
    pub chapter: u32,
    pub verse_count: u32,
    pub paging: Paging,
}

impl VerseSource {
    pub fn new(chapter: u32, verse_count: u32, paging: Paging) -> Self {
        Self {
            chapter,
            verse_count,
            paging,
        }
    }

    /// Verses of `page`; empty past the last page.
    pub fn fetch_page(&self, page: u32) -> Vec<VerseRecord> {
        let range = self.paging.index_range(page);
        (range.start..range.end.min(self.verse_count))
            .map(|index| self.verse(index + 1))
            .collect()
    }

    fn verse(&self, verse_number: u32) -> VerseRecord {
        let mut seed = u64::from(self.chapter) * 7919 + u64::from(verse_number) * 104_729;
        let mut next = || {
            // xorshift
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };
        let len = 6 + (next() % 40) as usize;
        let text = (0..len)
            .map(|_| WORDS[(next() % WORDS.len() as u64) as usize])
            .collect::<Vec<_>>()
            .join(" ");
        VerseRecord {
            chapter: self.chapter,
            verse_number,
            text,
        }
    }
}

/// Tracks which pages were requested and spawns their fetches.
#[derive(Debug)]
pub struct PageLoader {
    source: VerseSource,
    total_pages: u32,
    latency: Duration,
    requested: BTreeSet<u32>,
}

impl PageLoader {
    pub fn new(source: VerseSource, lookup: &PagesLookup, latency: Duration) -> Self {
        Self {
            source,
            total_pages: lookup.total_pages,
            latency,
            requested: BTreeSet::new(),
        }
    }

    pub fn source(&self) -> &VerseSource {
        &self.source
    }

    /// Record a page that was delivered without going through [`request`].
    ///
    /// [`request`]: PageLoader::request
    pub fn mark_delivered(&mut self, page: u32) {
        self.requested.insert(page);
    }

    pub fn requested_count(&self) -> usize {
        self.requested.len()
    }

    /// Fetch `page` once.  Returns `false` if it is out of range or was
    /// already requested.
    pub fn request(&mut self, page: u32, tx: &EventSender) -> bool {
        if page == 0 || page > self.total_pages || !self.requested.insert(page) {
            return false;
        }
        let verses = self.source.fetch_page(page);
        let delay = jittered(self.latency, page);
        let tx = tx.clone();
        trace!(page, delay_ms = delay.as_millis() as u64, "page requested");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::PageLoaded { page, verses });
        });
        true
    }

    /// Request every page touching `indices`, plus one neighbour page on each
    /// side.
    pub fn request_around(&mut self, indices: std::ops::Range<u32>, tx: &EventSender) -> usize {
        if indices.is_empty() {
            return 0;
        }
        let paging = self.source.paging;
        let first = paging.page_of(indices.start).saturating_sub(1).max(1);
        let last = paging.page_of(indices.end - 1) + 1;
        (first..=last).filter(|&p| self.request(p, tx)).count()
    }
}

/// Between 0.5× and 1.5× `base`, fixed per page.
fn jittered(base: Duration, page: u32) -> Duration {
    let pct = 50 + (u64::from(page) * 37 % 101);
    base * pct as u32 / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::event;

    fn loader(verse_count: u32, latency_ms: u64) -> PageLoader {
        let paging = Paging::new(10);
        let source = VerseSource::new(2, verse_count, paging);
        let lookup = PagesLookup::for_chapter(2, verse_count, paging);
        PageLoader::new(source, &lookup, Duration::from_millis(latency_ms))
    }

    #[test]
    fn source_is_deterministic_and_clipped() {
        let source = VerseSource::new(2, 25, Paging::new(10));
        assert_eq!(source.fetch_page(2), source.fetch_page(2));
        let last = source.fetch_page(3);
        assert_eq!(last.len(), 5);
        assert_eq!(last.last().map(|v| v.verse_number), Some(25));
        assert!(source.fetch_page(4).is_empty());
    }

    #[test]
    fn jitter_stays_in_band() {
        let base = Duration::from_millis(400);
        for page in 1..200 {
            let d = jittered(base, page);
            assert!(d >= base / 2 && d <= base * 3 / 2, "{d:?}");
        }
    }

    #[tokio::test]
    async fn pages_are_requested_once() {
        let (tx, mut rx) = event::channel();
        let mut loader = loader(30, 1);
        loader.mark_delivered(1);

        assert!(!loader.request(1, &tx));
        assert!(loader.request(2, &tx));
        assert!(!loader.request(2, &tx));
        assert!(!loader.request(4, &tx));

        let ev = rx.recv().await;
        assert!(matches!(ev, Some(AppEvent::PageLoaded { page: 2, ref verses }) if verses.len() == 10));
    }

    #[tokio::test]
    async fn request_around_includes_neighbours() {
        let (tx, _rx) = event::channel();
        let mut loader = loader(100, 1);
        // Indices 30..35 sit on page 4.
        assert_eq!(loader.request_around(30..35, &tx), 3);
        assert_eq!(loader.requested_count(), 3);
        assert_eq!(loader.request_around(0..1, &tx), 2);
    }
}
