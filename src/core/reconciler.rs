//! Scroll reconciler – keeps the list aligned with a navigation target while
//! pages arrive out of order.
//!
//! The reconciler is an explicit state machine with two phases:
//!
//! * [`Phase::Idle`]  – nothing pending.
//! * [`Phase::Armed`] – an initial scroll was issued and the target's page
//!   neighbourhood may still be loading.
//!
//! It reacts to two events, [`Reconciler::navigation_changed`] and
//! [`Reconciler::page_map_changed`], and answers each with a list of
//! [`Effect`]s for the runtime to carry out.  The only asynchronous piece, the
//! fallback correction, is described by a [`FallbackRequest`] tagged with a
//! generation number; the runtime owns the actual timer and reports expiry via
//! [`Reconciler::fallback_elapsed`].
//!
//! Between page-map passes the reconciler keeps a [`PageSnapshot`] of the
//! pages loaded at the end of the previous pass.  A page is *newly loaded* if
//! it is loaded now but was not in that snapshot.  Navigation does not touch
//! the snapshot, so the next diff is always against the most recent pass.

use std::time::Duration;

use tracing::{debug, trace};

use super::navigation::{self, DisplayMode, VerseTarget};
use super::page_map::{PageMap, PageSnapshot};
use super::paging::Paging;

/// Reference delay of the one-shot fallback correction.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    pub paging: Paging,
    pub fallback_delay: Duration,
}

impl ReconcilerConfig {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            paging: Paging::new(items_per_page),
            fallback_delay: DEFAULT_FALLBACK_DELAY,
        }
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Armed,
}

/// A one-shot delayed correction the runtime should schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackRequest {
    pub generation: u64,
    pub delay: Duration,
    pub target: VerseTarget,
}

/// Side effects requested by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Scroll the list to the start of this verse now.
    ScrollTo(VerseTarget),
    /// Arm a timer; report back through [`Reconciler::fallback_elapsed`].
    ScheduleFallback(FallbackRequest),
    /// Drop the timer of this generation, it has been superseded.
    CancelFallback { generation: u64 },
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ReconcilerConfig,
    phase: Phase,
    /// Current valid target; `None` while the navigation signal is invalid.
    target: Option<VerseTarget>,
    snapshot: PageSnapshot,
    /// Bumped on every accepted navigation.
    generation: u64,
    pending_fallback: Option<FallbackRequest>,
}

impl Reconciler {
    /// `initial` is the page map as it stands before the first pass.
    pub fn new(config: ReconcilerConfig, initial: &PageMap) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            target: None,
            snapshot: initial.snapshot(),
            generation: 0,
            pending_fallback: None,
        }
    }

    pub fn config(&self) -> ReconcilerConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_armed(&self) -> bool {
        self.phase == Phase::Armed
    }

    pub fn target(&self) -> Option<VerseTarget> {
        self.target
    }

    pub fn snapshot(&self) -> &PageSnapshot {
        &self.snapshot
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_fallback(&self) -> Option<FallbackRequest> {
        self.pending_fallback
    }

    /// A new navigation signal was observed.
    ///
    /// Every call counts as a change; callers deduplicate if their signal can
    /// repeat.  Invalid requests clear the target and disarm, so later passes
    /// are no-ops, and produce no effects.  A fallback already scheduled for
    /// the previous target is left to fire.
    pub fn navigation_changed(
        &mut self,
        mode: DisplayMode,
        raw: Option<&str>,
        chapter_verse_count: Option<u32>,
    ) -> Vec<Effect> {
        let target = match navigation::resolve(mode, raw, chapter_verse_count) {
            Ok(target) => target,
            Err(reason) => {
                debug!(%reason, ?raw, "navigation ignored");
                self.target = None;
                self.phase = Phase::Idle;
                return Vec::new();
            }
        };

        let mut effects = Vec::with_capacity(2);
        if let Some(stale) = self.pending_fallback.take() {
            effects.push(Effect::CancelFallback {
                generation: stale.generation,
            });
        }
        self.generation = self.generation.wrapping_add(1);
        self.target = Some(target);
        self.phase = Phase::Armed;
        effects.push(Effect::ScrollTo(target));

        debug!(
            verse = target.verse_number(),
            generation = self.generation,
            "navigation armed"
        );
        effects
    }

    /// The page map changed.  Runs one reconciliation pass and advances the
    /// snapshot whatever the outcome.
    pub fn page_map_changed(&mut self, pages: &PageMap) -> Vec<Effect> {
        let effects = match (self.phase, self.target) {
            (Phase::Armed, Some(target)) => self.reconcile(target, pages),
            _ => Vec::new(),
        };
        self.snapshot = pages.snapshot();
        effects
    }

    fn reconcile(&mut self, target: VerseTarget, pages: &PageMap) -> Vec<Effect> {
        let pos = self.config.paging.position(target.index());
        let newly_loaded = |page: u32| pages.is_newly_loaded(&self.snapshot, page);

        let relevant = newly_loaded(pos.page)
            || (pos.is_first_in_page && pos.page > 1 && newly_loaded(pos.page - 1))
            || (pos.is_last_in_page && newly_loaded(pos.page + 1));

        if relevant {
            // Rows above the target may have changed height; stay armed since
            // further neighbouring pages can still land.
            trace!(
                verse = target.verse_number(),
                page = pos.page,
                "correcting after page arrival"
            );
            return vec![Effect::ScrollTo(target)];
        }

        let request = FallbackRequest {
            generation: self.generation,
            delay: self.config.fallback_delay,
            target,
        };
        self.pending_fallback = Some(request);
        self.phase = Phase::Idle;
        debug!(
            verse = target.verse_number(),
            generation = request.generation,
            delay_ms = request.delay.as_millis() as u64,
            "unrelated page update, scheduling fallback and disarming"
        );
        vec![Effect::ScheduleFallback(request)]
    }

    /// The timer for `generation` fired.  Returns the correction to apply, or
    /// `None` if that fallback was superseded.
    pub fn fallback_elapsed(&mut self, generation: u64) -> Option<Effect> {
        match self.pending_fallback {
            Some(request) if request.generation == generation => {
                self.pending_fallback = None;
                Some(Effect::ScrollTo(request.target))
            }
            _ => {
                debug!(generation, current = self.generation, "stale fallback dropped");
                None
            }
        }
    }
}
