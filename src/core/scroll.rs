//! Scroll commands sent to the windowed-list controller.

use tracing::debug;

/// Upward shift applied to every verse scroll so that UI anchored to the
/// top of the verse does not cover it.
pub const DEFAULT_UPWARD_SHIFT_PX: u32 = 70;

/// Where the target row should land in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    #[default]
    Start,
    Center,
    End,
}

/// A single "scroll to index" instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommand {
    pub index: u32,
    pub align: ScrollAlign,
    pub offset_px: i32,
}

/// The external windowed list.  Each command supersedes whatever scroll was
/// in flight from an earlier one.
pub trait ScrollController {
    fn scroll_to_index(&mut self, command: ScrollCommand);
}

/// Converts verse numbers into [`ScrollCommand`]s and issues them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCommander {
    offset_px: i32,
}

impl Default for ScrollCommander {
    fn default() -> Self {
        Self::with_upward_shift(DEFAULT_UPWARD_SHIFT_PX)
    }
}

impl ScrollCommander {
    /// The shift is applied as a negative offset and is never zero.
    pub fn with_upward_shift(px: u32) -> Self {
        let px = i32::try_from(px.max(1)).unwrap_or(i32::MAX);
        Self { offset_px: -px }
    }

    pub fn offset_px(&self) -> i32 {
        self.offset_px
    }

    /// The command that puts `verse_number` at the top of the viewport.
    pub fn command_for(&self, verse_number: u32) -> ScrollCommand {
        ScrollCommand {
            index: verse_number.saturating_sub(1),
            align: ScrollAlign::Start,
            offset_px: self.offset_px,
        }
    }

    pub fn scroll_to_verse<C: ScrollController + ?Sized>(&self, controller: &mut C, verse_number: u32) {
        let command = self.command_for(verse_number);
        debug!(
            verse_number,
            index = command.index,
            offset_px = command.offset_px,
            "scroll to verse"
        );
        controller.scroll_to_index(command);
    }
}
