//! Core reconciliation logic – paging arithmetic, the page map, navigation
//! resolution and the scroll reconciler state machine.
//!
//! Nothing in this module depends on any TUI or rendering crate, and nothing
//! here spawns tasks or reads the clock: every decision is a pure function of
//! already-available data, and side effects are returned to the caller.

pub mod chapter;
pub mod navigation;
pub mod page_map;
pub mod paging;
pub mod reader_data;
pub mod reconciler;
pub mod scroll;
