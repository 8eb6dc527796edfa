//! Application layer: state, input handling and the async collaborators
//! (terminal events, page fetches, the fallback timer).

pub mod event;
pub mod fallback;
pub mod handler;
pub mod page_loader;
pub mod reader;
pub mod state;
