//! A paged verse reader for the terminal.
//!
//! Opens one chapter in a windowed list whose pages stream in from a
//! simulated source, and keeps the list aligned with the requested verse
//! (`--verse`, the `:` prompt, or the next/previous verse keys) while they do.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::info;

use crate::app::{
    event::{self, spawn_terminal_reader, AppEvent, EventSender},
    handler,
    page_loader::{PageLoader, VerseSource},
    reader,
    state::{AppState, InputMode},
};
use crate::config::AppConfig;
use crate::core::{
    chapter::ChapterCatalog,
    navigation::DisplayMode,
    page_map::VerseRecord,
    paging::Paging,
    reader_data::{PagesLookup, ReaderData},
    reconciler::Phase,
};
use crate::ui::{layout::AppLayout, theme::Theme, verse_list::VerseList};

const TICK_RATE: Duration = Duration::from_millis(50);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Paged verse reader")]
struct Cli {
    /// Chapter to open (1-114).
    #[arg(default_value_t = 2)]
    chapter: u32,

    /// Verse to start at.  Passed through as given; invalid values are ignored.
    #[arg(long)]
    verse: Option<String>,

    /// Display mode.  Only `chapter` uses the aligned verse list.
    #[arg(long, default_value = "chapter")]
    mode: DisplayMode,

    /// Verses per fetched page (overrides the config file).
    #[arg(long)]
    items_per_page: Option<u32>,

    /// Base latency of the simulated page source, in milliseconds.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; the TUI owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(n) = cli.items_per_page {
        config.reader.items_per_page = n.clamp(1, 100);
    }
    if let Some(ms) = cli.latency_ms {
        config.reader.fetch_latency_ms = ms.min(10_000);
    }
    if cli.write_config {
        config.save()?;
        return Ok(());
    }

    let Some(verse_count) = ChapterCatalog.verse_count(cli.chapter) else {
        bail!(
            "chapter {} does not exist (expected 1-{})",
            cli.chapter,
            ChapterCatalog::CHAPTER_COUNT
        );
    };

    // ── initial reader data ───────────────────────────────────
    let paging = Paging::new(config.reader.items_per_page);
    let source = VerseSource::new(cli.chapter, verse_count, paging);
    let lookup = PagesLookup::for_chapter(cli.chapter, verse_count, paging);
    let first_page = source.fetch_page(1);
    let loader = PageLoader::new(source, &lookup, config.reader.fetch_latency());
    let reader_data = ReaderData::assemble(lookup, first_page);
    info!(
        chapter = cli.chapter,
        verse_count,
        pages = reader_data.pages_lookup.total_pages,
        initial_verses = reader_data.metadata.number_of_verses,
        "reader data assembled"
    );

    let mut state = AppState::new(
        cli.chapter,
        Some(verse_count),
        cli.mode,
        reader_data,
        loader,
        config,
    );
    if !cli.mode.is_virtualized_chapter() {
        state.status_message = Some(format!(
            "{} mode: verse navigation is not aligned in this view",
            cli.mode
        ));
    }

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, &mut state, cli.verse).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
    start_verse: Option<String>,
) -> Result<()> {
    let (tx, mut rx) = event::channel();
    spawn_terminal_reader(tx.clone(), TICK_RATE);

    // Measure before the first navigation so the initial scroll lands on
    // real rows rather than an unmeasured list.
    let size = terminal.size()?;
    let layout = AppLayout::from_area(Rect::new(0, 0, size.width, size.height));
    let (width, height) = layout.list_inner();
    state.list.set_viewport_rows(height as usize);
    state.remeasure(width);

    if start_verse.is_some() {
        reader::navigate(state, start_verse, &tx);
    }
    reader::request_visible_pages(state, &tx);

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| draw(frame, state))?;

        let Some(first) = rx.recv().await else {
            break;
        };

        // Drain everything already queued so pages that completed together
        // are reconciled in one pass.  Other events flush the pending pages
        // first to keep arrival order.
        let mut arrived: Vec<(u32, Vec<VerseRecord>)> = Vec::new();
        let mut next = Some(first);
        while let Some(ev) = next {
            match ev {
                AppEvent::PageLoaded { page, verses } => arrived.push((page, verses)),
                other => {
                    flush_arrivals(state, &mut arrived, &tx);
                    handle_event(state, other, &tx);
                }
            }
            next = rx.try_recv().ok();
        }
        flush_arrivals(state, &mut arrived, &tx);

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

fn flush_arrivals(state: &mut AppState, arrived: &mut Vec<(u32, Vec<VerseRecord>)>, tx: &EventSender) {
    if !arrived.is_empty() {
        reader::pages_arrived(state, arrived.drain(..), tx);
    }
}

fn handle_event(state: &mut AppState, ev: AppEvent, tx: &EventSender) {
    match ev {
        AppEvent::Key(k) => handler::handle_key(state, k, tx),
        AppEvent::Mouse(m) => handler::handle_mouse(state, m, tx),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            if state.list.is_animating() {
                state.list.tick();
            }
        }
        AppEvent::FallbackElapsed { generation } => reader::fallback_elapsed(state, generation, tx),
        AppEvent::PageLoaded { page, verses } => reader::pages_arrived(state, [(page, verses)], tx),
    }
}

// ───────────────────────────────────────── drawing ──────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());
    let (width, _) = layout.list_inner();
    if width != state.list_width {
        state.remeasure(width);
    }

    let paging = state.paging();
    let title = format!(
        " chapter {} · {} verses · {} per page · {} ",
        state.chapter,
        state.verse_count.unwrap_or(0),
        paging.items_per_page(),
        state.display_mode
    );
    let block = Block::default()
        .title(title)
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());

    let highlight = state.reconciler.target().map(|t| t.index() as usize);
    let list = VerseList::new(&state.page_map, &state.metrics, paging)
        .highlight(highlight)
        .block(block);
    frame.render_stateful_widget(list, layout.list_area, &mut state.list);

    let status = match state.input_mode {
        InputMode::Goto => Paragraph::new(format!("go to verse: {}_", state.goto_buffer))
            .style(Theme::prompt_style()),
        InputMode::Normal => Paragraph::new(status_line(state)).style(Theme::status_bar_style()),
    };
    frame.render_widget(status, layout.status_area);
}

fn status_line(state: &AppState) -> String {
    if let Some(msg) = &state.status_message {
        return msg.clone();
    }
    let paging = state.paging();
    let top = state.top_verse();
    let page = paging.page_of(top.saturating_sub(1));
    let span = state
        .pages_lookup
        .bounds(page)
        .map(|b| format!(" ({}-{})", b.from, b.to))
        .unwrap_or_default();

    let mut flags = String::new();
    if state.reconciler.phase() == Phase::Armed {
        let key = state
            .reconciler
            .target()
            .and_then(|t| state.page_map.verse(t.index(), paging))
            .map(VerseRecord::verse_key);
        match key {
            Some(key) => flags.push_str(&format!(" · aligning on {key}")),
            None => flags.push_str(" · aligning"),
        }
    }
    if let Some(request) = state.reconciler.pending_fallback() {
        flags.push_str(&format!(" · settling on {}", request.target.verse_number()));
    }
    format!(
        "{} │ verse {}/{} · page {}/{}{} · {} loaded{}",
        state.config.status_bar_hint(),
        top,
        state.verse_count.unwrap_or(0),
        page,
        state.pages_lookup.total_pages,
        span,
        state.page_map.loaded_page_count(),
        flags,
    )
}
