//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Verse list on top, a one-line status / prompt bar below.
pub struct AppLayout {
    pub list_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        Self {
            list_area: chunks[0],
            status_area: chunks[1],
        }
    }

    /// Inner size of the bordered list pane.
    pub fn list_inner(&self) -> (u16, u16) {
        (
            self.list_area.width.saturating_sub(2),
            self.list_area.height.saturating_sub(2),
        )
    }
}
