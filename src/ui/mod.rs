//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer turns the page map and row metrics into cells on the terminal
//! and owns the scroll position of the verse list.  No fetching happens here.

pub mod layout;
pub mod smooth_scroll;
pub mod theme;
pub mod verse_list;
