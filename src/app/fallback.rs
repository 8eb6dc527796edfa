//! Owned handle for the reconciler's one-shot fallback correction.
//!
//! At most one timer is alive.  Scheduling a new one or cancelling by
//! generation aborts the task, so a superseded fallback never reaches the
//! event loop.  The reconciler still checks the generation on expiry, which
//! covers a timer that fired just before it was aborted.

use tokio::task::JoinHandle;
use tracing::debug;

use super::event::{AppEvent, EventSender};
use crate::core::reconciler::FallbackRequest;

#[derive(Debug, Default)]
pub struct FallbackTimer {
    pending: Option<(u64, JoinHandle<()>)>,
}

impl FallbackTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `request`, replacing any previous one.
    pub fn schedule(&mut self, request: FallbackRequest, tx: &EventSender) {
        self.abort();
        let tx = tx.clone();
        let generation = request.generation;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(request.delay).await;
            let _ = tx.send(AppEvent::FallbackElapsed { generation });
        });
        self.pending = Some((generation, handle));
    }

    /// Cancel the timer of `generation`, if that is the one pending.
    pub fn cancel(&mut self, generation: u64) {
        if self.pending_generation() == Some(generation) {
            debug!(generation, "fallback cancelled");
            self.abort();
        }
    }

    /// The timer of `generation` delivered its event; forget the handle.
    pub fn settle(&mut self, generation: u64) {
        if self.pending_generation() == Some(generation) {
            self.pending = None;
        }
    }

    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(|(generation, _)| *generation)
    }

    fn abort(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for FallbackTimer {
    fn drop(&mut self) {
        self.abort();
    }
}
