//! Windowed verse list, the scroll target the reconciler steers.
//!
//! Row heights come from the page map: a verse whose page has not arrived
//! renders as a one-line placeholder, a loaded verse wraps to as many lines as
//! its text needs.  The scroll position is an absolute row, fixed at the time
//! a [`ScrollCommand`] is applied, so pages landing above it push the target
//! out of place until the next command re-measures.

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::page_map::PageMap;
use crate::core::paging::Paging;
use crate::core::scroll::{ScrollAlign, ScrollCommand, ScrollController};

use super::smooth_scroll::SmoothScroll;
use super::theme::Theme;

/// Width of `"  286 │ "`.
const GUTTER: usize = 8;
/// Blank line below every verse.
const SEPARATOR_ROWS: usize = 1;

fn text_width(area_width: u16) -> usize {
    (area_width as usize).saturating_sub(GUTTER).max(1)
}

/// Greedy word wrap.  Words longer than `width` are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
        let len = chars.len();
        if len == 0 {
            continue;
        }
        if current_len > 0 && current_len + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += len;
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

// ───────────────────────────────────────── metrics ───────────

/// Measured row offsets of every verse at one list width.
#[derive(Debug, Clone, Default)]
pub struct RowMetrics {
    starts: Vec<usize>,
    total_rows: usize,
}

impl RowMetrics {
    pub fn measure(pages: &PageMap, paging: Paging, verse_count: u32, width: u16) -> Self {
        let text_width = text_width(width);
        let mut starts = Vec::with_capacity(verse_count as usize);
        let mut row = 0;
        for index in 0..verse_count {
            starts.push(row);
            let body = pages
                .verse(index, paging)
                .map_or(1, |v| wrap_words(&v.text, text_width).len().max(1));
            row += body + SEPARATOR_ROWS;
        }
        Self {
            starts,
            total_rows: row,
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// First row of `index`; past the end maps to `total_rows`.
    pub fn row_of(&self, index: usize) -> usize {
        self.starts.get(index).copied().unwrap_or(self.total_rows)
    }

    pub fn height_of(&self, index: usize) -> usize {
        self.row_of(index + 1).saturating_sub(self.row_of(index))
    }

    /// Index of the verse covering `row`.
    pub fn index_at_row(&self, row: usize) -> usize {
        self.starts.partition_point(|&s| s <= row).saturating_sub(1)
    }
}

// ───────────────────────────────────────── state ─────────────

/// Persistent scroll state of the list.
#[derive(Debug, Clone)]
pub struct VerseListState {
    /// Logical first row of the viewport.
    scroll_row: usize,
    smooth: SmoothScroll,
    px_per_row: u32,
    viewport_rows: usize,
    last_command: Option<ScrollCommand>,
}

impl VerseListState {
    pub fn new(px_per_row: u32) -> Self {
        Self {
            scroll_row: 0,
            smooth: SmoothScroll::new(0.45, 40),
            px_per_row: px_per_row.max(1),
            viewport_rows: 0,
            last_command: None,
        }
    }

    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows;
    }

    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn last_command(&self) -> Option<ScrollCommand> {
        self.last_command
    }

    pub fn is_animating(&self) -> bool {
        self.smooth.is_animating()
    }

    pub fn tick(&mut self) {
        self.smooth.tick();
    }

    fn max_scroll(&self, metrics: &RowMetrics) -> usize {
        metrics.total_rows().saturating_sub(self.viewport_rows)
    }

    /// Row actually drawn at the top this frame.
    pub fn drawn_row(&self, metrics: &RowMetrics) -> usize {
        let row = self.scroll_row as isize + self.smooth.row_offset();
        (row.max(0) as usize).min(self.max_scroll(metrics))
    }

    /// User scrolling: immediate, no animation.
    pub fn scroll_by(&mut self, delta: isize, metrics: &RowMetrics) {
        self.smooth.settle();
        let row = self.scroll_row.min(self.max_scroll(metrics)) as isize + delta;
        self.scroll_row = (row.max(0) as usize).min(self.max_scroll(metrics));
    }

    /// Verses at least partly inside the viewport.
    pub fn visible_indices(&self, metrics: &RowMetrics) -> Range<usize> {
        if metrics.is_empty() {
            return 0..0;
        }
        let top = self.drawn_row(metrics);
        let bottom = top + self.viewport_rows.max(1) - 1;
        metrics.index_at_row(top)..metrics.index_at_row(bottom) + 1
    }

    pub fn controller<'a>(&'a mut self, metrics: &'a RowMetrics) -> ListController<'a> {
        ListController {
            state: self,
            metrics,
        }
    }

    fn offset_rows(&self, offset_px: i32) -> isize {
        (f64::from(offset_px) / f64::from(self.px_per_row)).round() as isize
    }

    fn apply(&mut self, command: ScrollCommand, metrics: &RowMetrics) {
        let index = command.index as usize;
        let start = metrics.row_of(index) as isize;
        let height = metrics.height_of(index) as isize;
        let viewport = self.viewport_rows as isize;
        let aligned = match command.align {
            ScrollAlign::Start => start,
            ScrollAlign::Center => start + height / 2 - viewport / 2,
            ScrollAlign::End => start + height - viewport,
        };
        let row = aligned + self.offset_rows(command.offset_px);
        let row = (row.max(0) as usize).min(self.max_scroll(metrics));

        self.smooth.retarget(self.scroll_row, row);
        self.scroll_row = row;
        self.last_command = Some(command);
        tracing::trace!(index, row, "list scrolled");
    }
}

/// [`ScrollController`] view of the list for one set of measurements.
pub struct ListController<'a> {
    state: &'a mut VerseListState,
    metrics: &'a RowMetrics,
}

impl ScrollController for ListController<'_> {
    fn scroll_to_index(&mut self, command: ScrollCommand) {
        self.state.apply(command, self.metrics);
    }
}

// ───────────────────────────────────────── widget ────────────

/// The list widget itself, created fresh each frame.
pub struct VerseList<'a> {
    pages: &'a PageMap,
    metrics: &'a RowMetrics,
    paging: Paging,
    highlight: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> VerseList<'a> {
    pub fn new(pages: &'a PageMap, metrics: &'a RowMetrics, paging: Paging) -> Self {
        Self {
            pages,
            metrics,
            paging,
            highlight: None,
            block: None,
        }
    }

    /// Emphasise the verse at this 0-based index.
    pub fn highlight(mut self, index: Option<usize>) -> Self {
        self.highlight = index;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Exactly `metrics.height_of(index)` lines.
    fn verse_lines(&self, index: usize, text_width: usize) -> Vec<Line<'static>> {
        let number_style = if self.highlight == Some(index) {
            Theme::target_style()
        } else {
            Theme::verse_number_style()
        };
        let gutter = Span::styled(format!("{:>5} │ ", index + 1), number_style);
        let blank_gutter = Span::styled(format!("{:>5} │ ", ""), Theme::border_style());

        let mut lines = match self.pages.verse(index as u32, self.paging) {
            Some(verse) => {
                let wrapped = wrap_words(&verse.text, text_width);
                let mut out = Vec::with_capacity(wrapped.len() + SEPARATOR_ROWS);
                for (i, text) in wrapped.into_iter().enumerate() {
                    let lead = if i == 0 { gutter.clone() } else { blank_gutter.clone() };
                    out.push(Line::from(vec![lead, Span::styled(text, Theme::verse_text_style())]));
                }
                if out.is_empty() {
                    out.push(Line::from(gutter));
                }
                out
            }
            None => vec![Line::from(vec![
                gutter,
                Span::styled("loading…", Theme::placeholder_style()),
            ])],
        };
        lines.extend(std::iter::repeat_n(Line::default(), SEPARATOR_ROWS));
        lines
    }
}

impl StatefulWidget for VerseList<'_> {
    type State = VerseListState;

    fn render(mut self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        state.set_viewport_rows(inner.height as usize);
        if self.metrics.is_empty() {
            return;
        }

        let height = inner.height as usize;
        let text_width = text_width(inner.width);
        let top = state.drawn_row(self.metrics);
        let mut index = self.metrics.index_at_row(top);
        let mut skip = top - self.metrics.row_of(index);
        let mut y = 0;

        while y < height && index < self.metrics.len() {
            for line in self.verse_lines(index, text_width).into_iter().skip(skip) {
                if y >= height {
                    break;
                }
                buf.set_line(inner.x, inner.y + y as u16, &line, inner.width);
                y += 1;
            }
            skip = 0;
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page_map::VerseRecord;
    use crate::core::scroll::ScrollCommander;

    const LONG: &str = "and when they were told believe as the people have believed they \
                        said should we believe as the foolish have believed";

    fn page(n: u32, text: &str) -> Vec<VerseRecord> {
        let start = (n - 1) * 10 + 1;
        (start..start + 10)
            .map(|verse_number| VerseRecord {
                chapter: 2,
                verse_number,
                text: text.to_string(),
            })
            .collect()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn wrap_respects_width_and_splits_long_words() {
        assert_eq!(wrap_words("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap_words("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap_words("   ", 10).is_empty());
    }

    #[test]
    fn placeholders_take_two_rows() {
        let metrics = RowMetrics::measure(&PageMap::new(), Paging::new(10), 20, 40);
        assert_eq!(metrics.len(), 20);
        assert_eq!(metrics.total_rows(), 40);
        assert_eq!(metrics.row_of(10), 20);
        assert_eq!(metrics.index_at_row(21), 10);
        assert_eq!(metrics.row_of(99), 40);
    }

    #[test]
    fn loading_a_page_above_shifts_the_target() {
        let paging = Paging::new(10);
        let mut pages = PageMap::new();
        let before = RowMetrics::measure(&pages, paging, 20, 40);
        pages.insert_page(1, page(1, LONG));
        let after = RowMetrics::measure(&pages, paging, 20, 40);

        assert!(after.row_of(10) > before.row_of(10));
        assert!(after.height_of(0) > 2);
        assert_eq!(after.height_of(10), 2);
    }

    #[test]
    fn start_alignment_applies_pixel_offset() {
        let metrics = RowMetrics::measure(&PageMap::new(), Paging::new(10), 50, 40);
        let mut list = VerseListState::new(35);
        list.set_viewport_rows(10);

        ScrollCommander::default().scroll_to_verse(&mut list.controller(&metrics), 11);
        // Row 20 minus round(70 / 35) rows.
        assert_eq!(list.scroll_row(), 18);
        assert_eq!(list.last_command().map(|c| c.index), Some(10));
    }

    #[test]
    fn scroll_is_clamped_to_the_end() {
        let metrics = RowMetrics::measure(&PageMap::new(), Paging::new(10), 20, 40);
        let mut list = VerseListState::new(35);
        list.set_viewport_rows(10);

        ScrollCommander::default().scroll_to_verse(&mut list.controller(&metrics), 20);
        assert_eq!(list.scroll_row(), 30);

        list.scroll_by(-100, &metrics);
        assert_eq!(list.scroll_row(), 0);
        assert!(!list.is_animating());
    }

    #[test]
    fn renders_from_the_drawn_row() {
        let paging = Paging::new(10);
        let mut pages = PageMap::new();
        pages.insert_page(2, page(2, "short text"));
        let metrics = RowMetrics::measure(&pages, paging, 20, 30);

        let mut list = VerseListState::new(35);
        list.set_viewport_rows(6);
        list.controller(&metrics).scroll_to_index(ScrollCommand {
            index: 10,
            align: ScrollAlign::Start,
            offset_px: 0,
        });
        list.smooth.settle();

        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        VerseList::new(&pages, &metrics, paging)
            .highlight(Some(10))
            .render(area, &mut buf, &mut list);

        assert_eq!(row_text(&buf, 0).trim_end(), "   11 │ short text");
        assert_eq!(row_text(&buf, 1).trim(), "");
        assert_eq!(row_text(&buf, 2).trim_end(), "   12 │ short text");
    }

    #[test]
    fn visible_range_covers_viewport() {
        let metrics = RowMetrics::measure(&PageMap::new(), Paging::new(10), 20, 40);
        let mut list = VerseListState::new(35);
        list.set_viewport_rows(5);
        list.scroll_by(4, &metrics);
        assert_eq!(list.visible_indices(&metrics), 2..5);
    }
}
