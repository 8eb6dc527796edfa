//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::config::Action;

use super::event::EventSender;
use super::reader;
use super::state::{AppState, InputMode};

/// Rows moved per mouse-wheel notch.
const WHEEL_ROWS: isize = 3;
/// Longest input accepted by the goto prompt.
const GOTO_MAX_LEN: usize = 8;

/// Process a key event, dispatching on the input mode.
pub fn handle_key(state: &mut AppState, key: KeyEvent, tx: &EventSender) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.input_mode {
        InputMode::Normal => handle_reader_key(state, key, tx),
        InputMode::Goto => handle_goto_key(state, key, tx),
    }
}

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent, tx: &EventSender) {
    match mouse.kind {
        MouseEventKind::ScrollUp => scroll_list(state, -WHEEL_ROWS, tx),
        MouseEventKind::ScrollDown => scroll_list(state, WHEEL_ROWS, tx),
        _ => {}
    }
}

fn handle_reader_key(state: &mut AppState, key: KeyEvent, tx: &EventSender) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };
    let page_rows = state.list.viewport_rows().saturating_sub(1).max(1) as isize;

    match action {
        Action::ScrollUp => scroll_list(state, -1, tx),
        Action::ScrollDown => scroll_list(state, 1, tx),
        Action::PageUp => scroll_list(state, -page_rows, tx),
        Action::PageDown => scroll_list(state, page_rows, tx),
        Action::PrevVerse => step_verse(state, -1, tx),
        Action::NextVerse => step_verse(state, 1, tx),
        Action::GotoVerse => {
            state.input_mode = InputMode::Goto;
            state.goto_buffer.clear();
        }
        Action::Quit => state.should_quit = true,
    }
}

fn handle_goto_key(state: &mut AppState, key: KeyEvent, tx: &EventSender) {
    match key.code {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
            state.goto_buffer.clear();
        }
        KeyCode::Enter => {
            state.input_mode = InputMode::Normal;
            let raw = std::mem::take(&mut state.goto_buffer);
            reader::navigate(state, Some(raw), tx);
        }
        KeyCode::Backspace => {
            state.goto_buffer.pop();
        }
        KeyCode::Char(c) if state.goto_buffer.chars().count() < GOTO_MAX_LEN => {
            state.goto_buffer.push(c);
        }
        _ => {}
    }
}

fn scroll_list(state: &mut AppState, delta: isize, tx: &EventSender) {
    state.list.scroll_by(delta, &state.metrics);
    reader::request_visible_pages(state, tx);
}

/// Navigate relative to the current target, or to the top verse when there
/// is none.  Stepping past either end yields an out-of-range request, which
/// the reconciler ignores.
fn step_verse(state: &mut AppState, delta: i64, tx: &EventSender) {
    let current = state
        .reconciler
        .target()
        .map(|t| t.verse_number())
        .unwrap_or_else(|| state.top_verse());
    let next = i64::from(current) + delta;
    reader::navigate(state, Some(next.to_string()), tx);
}
