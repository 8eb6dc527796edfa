//! Event abstraction.
//!
//! Terminal input, page arrivals and timer expiry all flow through one
//! unbounded channel so the main loop waits on a single receiver and can
//! batch whatever is already queued.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use crate::core::page_map::VerseRecord;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    /// A page fetch completed.
    PageLoaded { page: u32, verses: Vec<VerseRecord> },
    /// The fallback correction timer of `generation` fired.
    FallbackElapsed { generation: u64 },
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Spawns a blocking task that polls the terminal and forwards its events.
/// A `Tick` is sent whenever nothing happened within `tick_rate`.
pub fn spawn_terminal_reader(tx: EventSender, tick_rate: Duration) {
    tokio::task::spawn_blocking(move || loop {
        let has_event = event::poll(tick_rate).unwrap_or(false);
        let app_event = if has_event {
            match event::read() {
                Ok(CtEvent::Key(k)) => AppEvent::Key(k),
                Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                _ => continue,
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(app_event).is_err() {
            break; // receiver dropped
        }
    });
}
