//! Chapter metadata lookup.

/// Verse count per chapter, indexed by `chapter - 1`.
const VERSE_COUNTS: [u32; 114] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53,
    89, 59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12,
    12, 30, 52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26,
    30, 20, 15, 21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

/// Static catalog answering `chapter_verse_count(chapter_id)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterCatalog;

impl ChapterCatalog {
    pub const CHAPTER_COUNT: u32 = VERSE_COUNTS.len() as u32;

    /// `None` for ids outside `1..=114`.
    pub fn verse_count(&self, chapter: u32) -> Option<u32> {
        let idx = usize::try_from(chapter.checked_sub(1)?).ok()?;
        VERSE_COUNTS.get(idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_verse() {
        let total: u32 = (1..=ChapterCatalog::CHAPTER_COUNT)
            .filter_map(|c| ChapterCatalog.verse_count(c))
            .sum();
        assert_eq!(total, 6236);
    }

    #[test]
    fn out_of_range_chapters() {
        assert_eq!(ChapterCatalog.verse_count(0), None);
        assert_eq!(ChapterCatalog.verse_count(115), None);
        assert_eq!(ChapterCatalog.verse_count(1), Some(7));
        assert_eq!(ChapterCatalog.verse_count(114), Some(6));
    }
}
