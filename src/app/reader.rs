//! Wiring between the reconciler and its collaborators.
//!
//! The reconciler decides; this module carries its [`Effect`]s out against the
//! verse list, the fallback timer and the page loader.

use tracing::debug;

use super::event::EventSender;
use super::state::AppState;
use crate::core::page_map::VerseRecord;
use crate::core::reconciler::Effect;

/// Feed a new navigation request through the reconciler.
pub fn navigate(state: &mut AppState, raw: Option<String>, tx: &EventSender) {
    let effects =
        state
            .reconciler
            .navigation_changed(state.display_mode, raw.as_deref(), state.verse_count);
    // An invalid request only disarms; a fallback scheduled for the previous
    // target stays pending and still fires.
    state.navigation = raw;

    if !effects.is_empty() {
        if let Some(target) = state.reconciler.target() {
            let index = target.index();
            let requested = state.loader.request_around(index..index + 1, tx);
            debug!(verse = target.verse_number(), requested, "pages requested for target");
        }
    }
    apply_effects(state, effects, tx);
}

/// Insert a batch of arrived pages and run one reconciliation pass over the
/// result.
pub fn pages_arrived(
    state: &mut AppState,
    batch: impl IntoIterator<Item = (u32, Vec<VerseRecord>)>,
    tx: &EventSender,
) {
    let mut inserted = 0;
    for (page, verses) in batch {
        if state.page_map.insert_page(page, verses) {
            inserted += 1;
        }
    }
    if inserted == 0 {
        return;
    }
    state.remeasure(state.list_width);
    debug!(
        inserted,
        pages = state.page_map.loaded_page_count(),
        verses = state.page_map.loaded_verse_count(),
        "pages arrived"
    );

    let effects = state.reconciler.page_map_changed(&state.page_map);
    apply_effects(state, effects, tx);
}

/// The fallback timer of `generation` fired.
pub fn fallback_elapsed(state: &mut AppState, generation: u64, tx: &EventSender) {
    if state.fallback.pending_generation() != Some(generation) {
        debug!(generation, "fallback fired after it was superseded");
    }
    state.fallback.settle(generation);
    if let Some(effect) = state.reconciler.fallback_elapsed(generation) {
        apply_effects(state, vec![effect], tx);
    }
}

/// Make sure everything on screen (and a page either side) is being fetched.
pub fn request_visible_pages(state: &mut AppState, tx: &EventSender) {
    let visible = state.list.visible_indices(&state.metrics);
    if visible.is_empty() {
        return;
    }
    state
        .loader
        .request_around(visible.start as u32..visible.end as u32, tx);
}

fn apply_effects(state: &mut AppState, effects: Vec<Effect>, tx: &EventSender) {
    for effect in effects {
        match effect {
            Effect::ScrollTo(target) => {
                let mut controller = state.list.controller(&state.metrics);
                state
                    .commander
                    .scroll_to_verse(&mut controller, target.verse_number());
            }
            Effect::ScheduleFallback(request) => state.fallback.schedule(request, tx),
            Effect::CancelFallback { generation } => state.fallback.cancel(generation),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::app::event::{self, AppEvent, EventReceiver};
    use crate::app::page_loader::{PageLoader, VerseSource};
    use crate::config::AppConfig;
    use crate::core::navigation::DisplayMode;
    use crate::core::paging::Paging;
    use crate::core::reader_data::{PagesLookup, ReaderData};

    /// Chapter 2 cut to `verse_count` verses, page 1 delivered, measured at
    /// 60 columns and showing 10 rows.
    pub(crate) fn test_state(verse_count: u32) -> (AppState, EventSender, EventReceiver) {
        let config = AppConfig::default();
        let paging = Paging::new(config.reader.items_per_page);
        let source = VerseSource::new(2, verse_count, paging);
        let lookup = PagesLookup::for_chapter(2, verse_count, paging);
        let first = source.fetch_page(1);
        let loader = PageLoader::new(source, &lookup, config.reader.fetch_latency());
        let data = ReaderData::assemble(lookup, first);

        let mut state = AppState::new(
            2,
            Some(verse_count),
            DisplayMode::Chapter,
            data,
            loader,
            config,
        );
        state.list.set_viewport_rows(10);
        state.remeasure(60);
        let (tx, rx) = event::channel();
        (state, tx, rx)
    }

    fn source_page(state: &AppState, page: u32) -> (u32, Vec<VerseRecord>) {
        (page, state.loader.source().fetch_page(page))
    }

    #[tokio::test]
    async fn navigation_scrolls_and_requests_pages() {
        let (mut state, tx, _rx) = test_state(40);
        navigate(&mut state, Some("11".into()), &tx);

        let cmd = state.list.last_command().unwrap();
        assert_eq!((cmd.index, cmd.offset_px), (10, -70));
        assert!(state.reconciler.is_armed());
        // Page 1 was seeded; pages 2 and 3 are in flight.
        assert_eq!(state.loader.requested_count(), 3);
        assert_eq!(state.navigation.as_deref(), Some("11"));
    }

    #[tokio::test]
    async fn target_page_arrival_realigns_the_list() {
        let (mut state, tx, _rx) = test_state(40);
        state.list.set_viewport_rows(4);
        // Narrow enough that every loaded verse wraps.
        state.remeasure(20);
        navigate(&mut state, Some("15".into()), &tx);
        let before = state.list.scroll_row();

        let page = source_page(&state, 2);
        pages_arrived(&mut state, [page], &tx);

        // Verse 15 moved down once verses 11-14 took their real height.
        let expected = state.metrics.row_of(14) - 2;
        assert!(expected > before);
        assert_eq!(state.list.scroll_row(), expected);
        assert!(state.reconciler.is_armed());
    }

    #[tokio::test]
    async fn unrelated_arrival_arms_the_fallback_timer() {
        let (mut state, tx, mut rx) = test_state(60);
        let mut config = state.config.reader;
        config.fallback_delay_ms = 10;
        state.reconciler = crate::core::reconciler::Reconciler::new(
            config.reconciler_config(),
            &state.page_map,
        );

        navigate(&mut state, Some("5".into()), &tx);
        let page = source_page(&state, 4);
        pages_arrived(&mut state, [page], &tx);
        let generation = state.fallback.pending_generation().unwrap();
        assert!(!state.reconciler.is_armed());

        // Scroll away, then let the fallback pull the list back.
        state.list.scroll_by(30, &state.metrics);
        loop {
            match rx.recv().await {
                Some(AppEvent::FallbackElapsed { generation: g }) => {
                    fallback_elapsed(&mut state, g, &tx);
                    break;
                }
                Some(_) => continue,
                None => panic!("channel closed"),
            }
        }
        assert_eq!(state.fallback.pending_generation(), None);
        assert_eq!(state.list.scroll_row(), state.metrics.row_of(4) - 2);
        assert_eq!(state.reconciler.generation(), generation);
    }

    #[tokio::test]
    async fn renavigation_cancels_the_fallback() {
        let (mut state, tx, _rx) = test_state(60);
        navigate(&mut state, Some("5".into()), &tx);
        let page = source_page(&state, 4);
        pages_arrived(&mut state, [page], &tx);
        assert!(state.fallback.pending_generation().is_some());

        navigate(&mut state, Some("45".into()), &tx);
        assert_eq!(state.fallback.pending_generation(), None);
        assert_eq!(state.list.last_command().map(|c| c.index), Some(44));
    }

    #[tokio::test]
    async fn invalid_navigation_leaves_the_list_alone() {
        let (mut state, tx, _rx) = test_state(20);
        for raw in ["0", "21", "x"] {
            navigate(&mut state, Some(raw.into()), &tx);
        }
        navigate(&mut state, None, &tx);
        assert_eq!(state.list.last_command(), None);
        assert_eq!(state.loader.requested_count(), 1);
    }

    #[tokio::test]
    async fn stepping_past_the_end_stops_aligning() {
        let (mut state, tx, _rx) = test_state(20);
        navigate(&mut state, Some("20".into()), &tx);
        assert!(state.reconciler.is_armed());

        navigate(&mut state, Some("21".into()), &tx);
        assert!(!state.reconciler.is_armed());
        assert_eq!(state.navigation.as_deref(), Some("21"));

        let page = source_page(&state, 2);
        pages_arrived(&mut state, [page], &tx);
        assert!(!state.reconciler.is_armed());
        assert_eq!(state.list.last_command().map(|c| c.index), Some(19));
    }

    #[tokio::test]
    async fn duplicate_pages_do_not_trigger_a_pass() {
        let (mut state, tx, _rx) = test_state(40);
        navigate(&mut state, Some("15".into()), &tx);
        let page = source_page(&state, 1);
        pages_arrived(&mut state, [page], &tx);
        // Page 1 was already loaded: no pass, so still armed and no timer.
        assert!(state.reconciler.is_armed());
        assert_eq!(state.fallback.pending_generation(), None);
    }
}
