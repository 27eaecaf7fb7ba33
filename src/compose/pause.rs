//! Pause counting and pass discovery.
//!
//! A walk replays the slide from the top on every pass. The tracker counts
//! the `\pause` markers the walk reaches; once the count exceeds the number
//! of pauses already consumed by earlier passes, the walk must stop and one
//! more pass is needed. Overlay bounds seen along the way raise the pass
//! count as well.

use crate::overlay::Overlay;

/// Result of reaching a pause marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    /// Already revealed on this pass, keep walking
    Continue,
    /// Not revealed yet, stop the walk
    Stop,
}

/// Inputs of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassState {
    /// 1-based pass number
    pub pass: usize,
    /// Pauses consumed by earlier passes
    pub pause_counter: usize,
}

impl PassState {
    /// State of the first pass.
    pub const FIRST: PassState = PassState { pass: 1, pause_counter: 0 };
}

/// Per-walk pause counter.
///
/// Nested builders (list items, table cells) borrow the walk's tracker, so
/// pauses are counted in document order across the whole walk.
#[derive(Debug, Clone)]
pub struct PauseTracker {
    state: PassState,
    reached: usize,
    max_pass: usize,
    ignore_pauses: bool,
}

impl PauseTracker {
    /// Create a tracker for a walk.
    pub fn new(state: PassState) -> Self {
        Self {
            state,
            reached: 0,
            max_pass: 1,
            ignore_pauses: false,
        }
    }

    /// Create a tracker that lets every pause through (deferred content).
    pub fn ignoring_pauses(state: PassState) -> Self {
        Self {
            ignore_pauses: true,
            ..Self::new(state)
        }
    }

    /// Current pass number.
    #[inline]
    pub fn pass(&self) -> usize {
        self.state.pass
    }

    /// Pauses reached so far in this walk.
    #[inline]
    pub fn reached(&self) -> usize {
        self.reached
    }

    /// Largest pass count discovered by this walk.
    #[inline]
    pub fn max_pass(&self) -> usize {
        self.max_pass
    }

    /// Record a pause marker.
    pub fn pause(&mut self) -> PauseOutcome {
        if self.ignore_pauses {
            return PauseOutcome::Continue;
        }

        self.reached += 1;
        if self.reached > self.state.pause_counter {
            self.max_pass = self.max_pass.max(self.state.pass + 1);
            log::trace!(
                "pause {} stops pass {} (max {})",
                self.reached,
                self.state.pass,
                self.max_pass
            );
            PauseOutcome::Stop
        } else {
            PauseOutcome::Continue
        }
    }

    /// Record an overlay bound without evaluating it.
    pub fn observe(&mut self, overlay: &Overlay) {
        self.max_pass = self.max_pass.max(overlay.max_bound());
    }

    /// Record an overlay and check it against the current pass.
    pub fn reveal(&mut self, overlay: &Overlay) -> bool {
        self.observe(overlay);
        overlay.is_visible(self.state.pass)
    }
}
