//! Navigation intent resolution.
//!
//! Turns a raw navigation request (typically a `startingVerse`-style query
//! value) into a validated [`VerseTarget`].  Callers that only care about
//! validity use `.ok()`; the error variants exist for diagnostics.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How the reader is currently presenting verses.
///
/// Only [`DisplayMode::Chapter`] uses the virtualized list handled by the
/// reconciler; every other mode scrolls through a different path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    #[default]
    Chapter,
    Verse,
    Range,
    Juz,
    Hizb,
    Rub,
    Page,
}

impl DisplayMode {
    pub const ALL: &[DisplayMode] = &[
        DisplayMode::Chapter,
        DisplayMode::Verse,
        DisplayMode::Range,
        DisplayMode::Juz,
        DisplayMode::Hizb,
        DisplayMode::Rub,
        DisplayMode::Page,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Chapter => "chapter",
            DisplayMode::Verse => "verse",
            DisplayMode::Range => "range",
            DisplayMode::Juz => "juz",
            DisplayMode::Hizb => "hizb",
            DisplayMode::Rub => "rub",
            DisplayMode::Page => "page",
        }
    }

    pub fn is_virtualized_chapter(self) -> bool {
        self == DisplayMode::Chapter
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown display mode `{0}`")]
pub struct UnknownDisplayMode(String);

impl FromStr for DisplayMode {
    type Err = UnknownDisplayMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DisplayMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.label() == wanted)
            .ok_or_else(|| UnknownDisplayMode(s.to_string()))
    }
}

/// Why a navigation request did not produce a target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("display mode `{0}` is not handled by the chapter reconciler")]
    UnsupportedMode(DisplayMode),
    #[error("chapter verse count is unknown")]
    UnknownChapter,
    #[error("no verse requested")]
    Missing,
    #[error("`{0}` is not a verse number")]
    Malformed(String),
    #[error("verse {verse} is outside 1..={verse_count}")]
    OutOfRange { verse: u64, verse_count: u32 },
}

/// A validated 1-based verse number inside the current chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseTarget {
    verse_number: u32,
}

impl VerseTarget {
    pub fn verse_number(self) -> u32 {
        self.verse_number
    }

    /// 0-based list index.
    pub fn index(self) -> u32 {
        self.verse_number - 1
    }
}

/// Resolve a raw navigation value against the chapter's verse count.
pub fn resolve(
    mode: DisplayMode,
    raw: Option<&str>,
    chapter_verse_count: Option<u32>,
) -> Result<VerseTarget, NavigationError> {
    if !mode.is_virtualized_chapter() {
        return Err(NavigationError::UnsupportedMode(mode));
    }
    let verse_count = chapter_verse_count.ok_or(NavigationError::UnknownChapter)?;
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(NavigationError::Missing)?;

    let verse: u64 = raw
        .parse()
        .map_err(|_| NavigationError::Malformed(raw.to_string()))?;
    if verse == 0 || verse > u64::from(verse_count) {
        return Err(NavigationError::OutOfRange { verse, verse_count });
    }

    // Bounded by `verse_count` above.
    Ok(VerseTarget {
        verse_number: verse as u32,
    })
}
