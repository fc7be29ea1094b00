//! Tracker for operations without a known total.

use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::hook::{NoOpHook, UpdateHook};
use crate::snapshot::Snapshot;
use crate::stats::Stats;
use crate::tracker::{Phase, Tracker};

/// Counts steps and measures throughput.
///
/// The counter is never clamped above. Negative advancement saturates at
/// zero, so the average's sample weight `index + 1` never drops below one.
///
/// # Example
/// ```
/// use tally_core::{Tracker, UnboundedTracker};
///
/// let mut tracker = UnboundedTracker::new();
/// tracker.advance(3);
/// tracker.advance(-5);
/// assert_eq!(tracker.index(), 0);
/// ```
pub struct UnboundedTracker {
    index: u64,
    stats: Stats,
    phase: Phase,
    hook: Box<dyn UpdateHook>,
}

impl UnboundedTracker {
    /// Create a tracker starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&TrackerConfig::default())
    }

    /// Create a tracker starting at `config.index`. Bound-related fields
    /// of the configuration are ignored.
    #[must_use]
    pub fn with_config(config: &TrackerConfig) -> Self {
        Self {
            index: config.index,
            stats: Stats::new(),
            phase: Phase::Created,
            hook: Box::new(NoOpHook),
        }
    }

    /// Replace the update hook.
    #[must_use]
    pub fn with_hook(self, hook: impl UpdateHook + 'static) -> Self {
        self.with_boxed_hook(Box::new(hook))
    }

    /// Replace the update hook with an already boxed one.
    #[must_use]
    pub fn with_boxed_hook(mut self, hook: Box<dyn UpdateHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Replace the clock. Start and last timestamps are re-read from it.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.stats = Stats::with_clock(Box::new(clock));
        self
    }

    fn recompute(&mut self) {
        let dt = self.stats.lap();
        self.stats.fold(dt, self.index);
        trace!(index = self.index, dt, avg = self.stats.avg(), "Recomputed statistics");
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.hook.on_update(&snapshot);
    }
}

impl Default for UnboundedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker for UnboundedTracker {
    fn index(&self) -> u64 {
        self.index
    }

    fn avg(&self) -> f64 {
        self.stats.avg()
    }

    fn elapsed_td(&self) -> Duration {
        self.stats.elapsed()
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            index: self.index,
            elapsed: self.elapsed(),
            avg: self.stats.avg(),
            bound: None,
        }
    }

    fn start(&mut self) {
        if self.phase == Phase::Created {
            self.phase = Phase::Started;
        }
        debug!(index = self.index, "Unbounded tracker started");
    }

    fn advance(&mut self, n: i64) {
        self.index = self.index.saturating_add_signed(n);
        self.phase = self.phase.advanced();
        self.recompute();
        self.notify();
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        let snapshot = self.snapshot();
        debug!(index = self.index, elapsed = snapshot.elapsed, "Unbounded tracker finished");
        self.hook.on_finish(&snapshot);
    }
}

impl std::fmt::Debug for UnboundedTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnboundedTracker")
            .field("index", &self.index)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
