//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use crate::config::AppConfig;
use crate::core::{
    navigation::DisplayMode,
    page_map::PageMap,
    paging::Paging,
    reader_data::{PagesLookup, ReaderData},
    reconciler::Reconciler,
    scroll::ScrollCommander,
};
use crate::ui::verse_list::{RowMetrics, VerseListState};

use super::fallback::FallbackTimer;
use super::page_loader::PageLoader;

/// Whether keys drive the list or the goto prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Goto,
}

/// Top-level application state.
pub struct AppState {
    pub chapter: u32,
    /// `None` when the chapter id is unknown; every navigation is then invalid.
    pub verse_count: Option<u32>,
    pub display_mode: DisplayMode,
    pub pages_lookup: PagesLookup,
    /// Owned by the fetch side; the reconciler only reads it.
    pub page_map: PageMap,
    pub list: VerseListState,
    /// Row layout at the last drawn width.
    pub metrics: RowMetrics,
    pub list_width: u16,
    pub reconciler: Reconciler,
    pub commander: ScrollCommander,
    pub loader: PageLoader,
    pub fallback: FallbackTimer,
    pub config: AppConfig,
    /// Last raw navigation request, as given.
    pub navigation: Option<String>,
    pub input_mode: InputMode,
    pub goto_buffer: String,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(
        chapter: u32,
        verse_count: Option<u32>,
        display_mode: DisplayMode,
        reader_data: ReaderData,
        mut loader: PageLoader,
        config: AppConfig,
    ) -> Self {
        let mut page_map = PageMap::new();
        if page_map.insert_page(1, reader_data.verses) {
            loader.mark_delivered(1);
        }
        let reconciler = Reconciler::new(config.reader.reconciler_config(), &page_map);

        Self {
            chapter,
            verse_count,
            display_mode,
            pages_lookup: reader_data.pages_lookup,
            page_map,
            list: VerseListState::new(config.reader.px_per_row),
            metrics: RowMetrics::default(),
            list_width: 0,
            reconciler,
            commander: config.reader.commander(),
            loader,
            fallback: FallbackTimer::new(),
            config,
            navigation: None,
            input_mode: InputMode::default(),
            goto_buffer: String::new(),
            status_message: None,
            should_quit: false,
        }
    }

    pub fn paging(&self) -> Paging {
        self.reconciler.config().paging
    }

    /// Re-measure rows for `width`, the page map as it is now.
    pub fn remeasure(&mut self, width: u16) {
        self.list_width = width;
        self.metrics = RowMetrics::measure(
            &self.page_map,
            self.paging(),
            self.verse_count.unwrap_or(0),
            width,
        );
    }

    /// Verse (1-based) at the top of the viewport.
    pub fn top_verse(&self) -> u32 {
        let row = self.list.drawn_row(&self.metrics);
        self.metrics.index_at_row(row) as u32 + 1
    }
}
