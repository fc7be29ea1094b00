//! Tracker for operations with a known total.

use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::hook::{NoOpHook, UpdateHook};
use crate::snapshot::{BoundStats, Snapshot};
use crate::stats::Stats;
use crate::tracker::{signed_delta, Phase, Tracker};

/// Tracks completion against a bound and projects an ETA.
///
/// The index always stays within `[0, max]`, and `remaining == max - index`
/// holds after every update. The moving average is kept per unit of step
/// delta, so advancing by varying amounts still yields a per-step rate.
///
/// # Example
/// ```
/// use tally_core::{BoundedTracker, Tracker, TrackerConfig};
///
/// let mut tracker = BoundedTracker::with_config(&TrackerConfig::default().with_max(4));
/// tracker.start();
/// tracker.advance(3);
/// assert_eq!(tracker.percent(), 75.0);
/// tracker.advance(5);
/// assert_eq!(tracker.index(), 4);
/// assert_eq!(tracker.remaining(), 0);
/// ```
pub struct BoundedTracker {
    index: u64,
    max: u64,
    delta: i64,
    backtrack: bool,
    remaining: u64,
    progress: f64,
    percent: f64,
    stats: Stats,
    phase: Phase,
    hook: Box<dyn UpdateHook>,
}

impl BoundedTracker {
    /// Create a tracker with the default bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&TrackerConfig::default())
    }

    /// Create a tracker from `config`. The initial index is clamped to the bound.
    #[must_use]
    pub fn with_config(config: &TrackerConfig) -> Self {
        let mut tracker = Self {
            index: config.index.min(config.max),
            max: config.max,
            delta: 0,
            backtrack: config.backtrack,
            remaining: 0,
            progress: 0.0,
            percent: 0.0,
            stats: Stats::new(),
            phase: Phase::Created,
            hook: Box::new(NoOpHook),
        };
        tracker.refresh_derived();
        tracker
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

    /// Step count representing completion.
    #[must_use]
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Reset the bound, e.g. once the total becomes known.
    ///
    /// The index is clamped to the new bound and the derived fields are
    /// refreshed; the hook is not notified.
    pub fn set_max(&mut self, max: u64) {
        self.max = max;
        self.index = self.index.min(max);
        self.refresh_derived();
    }

    /// Steps left until `max`.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Completion as a fraction in [0.0, 1.0].
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Completion as a percentage in [0.0, 100.0].
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Step change applied by the most recent update.
    #[must_use]
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Whether `goto` may move backwards.
    #[must_use]
    pub fn backtrack(&self) -> bool {
        self.backtrack
    }

    /// Projected whole seconds until `max`, never negative.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn eta(&self) -> u64 {
        let eta = (self.stats.avg() * self.remaining as f64).ceil();
        if eta.is_finite() && eta > 0.0 {
            eta as u64
        } else {
            0
        }
    }

    /// [`eta`](Self::eta) as a duration.
    #[must_use]
    pub fn eta_td(&self) -> Duration {
        Duration::from_secs(self.eta())
    }

    /// Jump to `target` (clamped to the bound).
    ///
    /// Unless backtracking is allowed, a target that does not move the
    /// index forward is ignored entirely: no recomputation, no hook call.
    pub fn goto(&mut self, target: u64) {
        let target = target.min(self.max);
        let delta = signed_delta(self.index, target);
        if delta <= 0 && !self.backtrack {
            trace!(index = self.index, target, "Ignored goto without forward movement");
            return;
        }

        self.index = target;
        self.delta = delta;
        self.phase = self.phase.advanced();
        self.recompute();
        self.notify();
    }

    #[allow(clippy::cast_precision_loss)]
    fn refresh_derived(&mut self) {
        self.progress = if self.max == 0 {
            1.0
        } else {
            (self.index as f64 / self.max as f64).min(1.0)
        };
        self.percent = self.progress * 100.0;
        self.remaining = self.max - self.index;
    }

    #[allow(clippy::cast_precision_loss)]
    fn recompute(&mut self) {
        self.refresh_derived();
        let dt = self.stats.lap();
        if self.delta != 0 {
            self.stats.fold(dt / self.delta as f64, self.index);
        }
        trace!(
            index = self.index,
            delta = self.delta,
            avg = self.stats.avg(),
            percent = self.percent,
            "Recomputed statistics"
        );
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.hook.on_update(&snapshot);
    }
}

impl Default for BoundedTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker for BoundedTracker {
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
            bound: Some(BoundStats {
                max: self.max,
                remaining: self.remaining,
                progress: self.progress,
                percent: self.percent,
                eta: self.eta(),
            }),
        }
    }

    fn start(&mut self) {
        if self.phase == Phase::Created {
            self.phase = Phase::Started;
        }
        self.delta = 0;
        self.recompute();
        debug!(index = self.index, max = self.max, "Bounded tracker started");
        self.notify();
    }

    fn advance(&mut self, n: i64) {
        let prev = self.index;
        self.index = self.index.saturating_add_signed(n).min(self.max);
        self.delta = signed_delta(prev, self.index);
        self.phase = self.phase.advanced();
        self.recompute();
        self.notify();
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        let snapshot = self.snapshot();
        debug!(
            index = self.index,
            max = self.max,
            elapsed = snapshot.elapsed,
            "Bounded tracker finished"
        );
        self.hook.on_finish(&snapshot);
    }

    fn observe_len(&mut self, len: Option<u64>) {
        if let Some(len) = len {
            debug!(previous = self.max, max = len, "Bound reset from source length");
            self.set_max(len);
        }
    }
}

impl std::fmt::Debug for BoundedTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedTracker")
            .field("index", &self.index)
            .field("max", &self.max)
            .field("delta", &self.delta)
            .field("backtrack", &self.backtrack)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::clock::ManualClock;

    fn bounded(max: u64) -> BoundedTracker {
        BoundedTracker::with_config(&TrackerConfig::default().with_max(max))
    }

    fn counting_hook() -> (Arc<AtomicUsize>, impl UpdateHook + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&calls);
        (calls, move |_: &Snapshot| {
            sink.fetch_add(1, Ordering::Relaxed);
        })
    }

    #[test]
    fn construction_defaults() {
        let tracker = BoundedTracker::new();
        assert_eq!(tracker.max(), 100);
        assert_eq!(tracker.remaining(), 100);
        assert_eq!(tracker.index(), 0);
        assert!(tracker.percent().abs() < f64::EPSILON);
        assert!(!tracker.backtrack());
        assert_eq!(tracker.eta(), 0);
    }

    #[test]
    fn initial_index_is_clamped() {
        let tracker =
            BoundedTracker::with_config(&TrackerConfig::default().with_index(50).with_max(10));
        assert_eq!(tracker.index(), 10);
        assert_eq!(tracker.remaining(), 0);
        assert!((tracker.percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scenario_max_four() {
        let mut tracker = bounded(4);
        tracker.start();
        assert_eq!(tracker.index(), 0);
        assert!(tracker.percent().abs() < f64::EPSILON);

        tracker.advance(1);
        assert_eq!(tracker.index(), 1);
        assert!((tracker.percent() - 25.0).abs() < f64::EPSILON);

        tracker.advance(2);
        assert_eq!(tracker.index(), 3);
        assert!((tracker.percent() - 75.0).abs() < f64::EPSILON);

        tracker.advance(5);
        assert_eq!(tracker.index(), 4);
        assert_eq!(tracker.delta(), 1);
        assert!((tracker.percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(tracker.remaining(), 0);
    }

    #[test]
    fn negative_advance_clamps_at_zero() {
        let mut tracker = bounded(10);
        tracker.advance(3);
        tracker.advance(-5);
        assert_eq!(tracker.index(), 0);
        assert_eq!(tracker.delta(), -3);
        assert_eq!(tracker.remaining(), 10);
    }

    #[test]
    fn average_is_normalized_by_delta() {
        let clock = ManualClock::new();
        let mut tracker = bounded(100).with_clock(clock.clone());
        clock.advance(Duration::from_secs(4));
        tracker.advance(4);
        assert!((tracker.avg() - 1.0).abs() < 1e-9);
        clock.advance(Duration::from_secs(2));
        tracker.advance(2);
        assert!((tracker.avg() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_delta_contributes_no_sample_but_moves_lap() {
        let clock = ManualClock::new();
        let mut tracker = bounded(10).with_clock(clock.clone());
        clock.advance(Duration::from_secs(30));
        tracker.start();
        assert!(tracker.avg().abs() < f64::EPSILON);

        clock.advance(Duration::from_secs(1));
        tracker.step();
        // The 30s before start() is not attributed to the first step.
        assert!((tracker.avg() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn eta_projects_remaining_steps() {
        let clock = ManualClock::new();
        let mut tracker = bounded(10).with_clock(clock.clone());
        tracker.start();
        clock.advance(Duration::from_millis(1500));
        tracker.advance(3);
        // avg 0.5s/step, 7 steps remaining -> 3.5s, rounded up
        assert_eq!(tracker.eta(), 4);
        assert_eq!(tracker.eta_td(), Duration::from_secs(4));
        assert_eq!(tracker.snapshot().eta(), Some(4));
    }

    #[test]
    fn goto_forward_moves() {
        let (calls, hook) = counting_hook();
        let mut tracker = bounded(10).with_hook(hook);
        tracker.goto(5);
        assert_eq!(tracker.index(), 5);
        assert_eq!(tracker.delta(), 5);
        assert!((tracker.percent() - 50.0).abs() < f64::EPSILON);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn goto_backward_without_backtrack_is_noop() {
        let (calls, hook) = counting_hook();
        let mut tracker = bounded(10).with_hook(hook);
        tracker.goto(5);
        let before = tracker.snapshot();
        tracker.goto(3);
        tracker.goto(5);
        assert_eq!(tracker.index(), 5);
        assert_eq!(tracker.delta(), 5);
        assert_eq!(tracker.snapshot(), before);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn goto_backward_with_backtrack() {
        let clock = ManualClock::new();
        let (calls, hook) = counting_hook();
        let mut tracker =
            BoundedTracker::with_config(&TrackerConfig::default().with_max(10).with_backtrack(true))
                .with_clock(clock.clone())
                .with_hook(hook);
        clock.advance(Duration::from_secs(5));
        tracker.goto(5);
        clock.advance(Duration::from_secs(2));
        tracker.goto(3);
        assert_eq!(tracker.index(), 3);
        assert_eq!(tracker.delta(), -2);
        assert_eq!(tracker.remaining(), 7);
        assert!((tracker.percent() - 30.0).abs() < f64::EPSILON);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        // (-1 + 3 * 1) / 4
        assert!((tracker.avg() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn goto_same_index_with_backtrack_recomputes() {
        let (calls, hook) = counting_hook();
        let mut tracker =
            BoundedTracker::with_config(&TrackerConfig::default().with_backtrack(true))
                .with_hook(hook);
        tracker.goto(0);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.delta(), 0);
    }

    #[test]
    fn goto_beyond_bound_clamps() {
        let mut tracker = bounded(10);
        tracker.goto(1_000);
        assert_eq!(tracker.index(), 10);
        assert_eq!(tracker.remaining(), 0);
    }

    #[test]
    fn negative_average_never_gives_negative_eta() {
        let clock = ManualClock::new();
        let mut tracker =
            BoundedTracker::with_config(&TrackerConfig::default().with_max(10).with_backtrack(true))
                .with_clock(clock.clone());
        tracker.goto(5);
        clock.advance(Duration::from_secs(10));
        tracker.goto(0);
        assert!(tracker.avg() < 0.0);
        assert_eq!(tracker.eta(), 0);
    }

    #[test]
    fn zero_bound_is_complete() {
        let mut tracker = bounded(0);
        tracker.start();
        assert!((tracker.progress() - 1.0).abs() < f64::EPSILON);
        assert_eq!(tracker.remaining(), 0);
        tracker.step();
        assert_eq!(tracker.index(), 0);
    }

    #[test]
    fn start_notifies_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut tracker = bounded(4).with_hook(move |s: &Snapshot| {
            sink.lock().unwrap().push((s.index, s.percent()));
        });
        tracker.start();
        tracker.step();
        assert_eq!(*seen.lock().unwrap(), [(0, Some(0.0)), (1, Some(25.0))]);
        assert_eq!(tracker.phase(), Phase::Advancing);
    }

    #[test]
    fn set_max_clamps_and_refreshes() {
        let mut tracker = bounded(10);
        tracker.goto(8);
        tracker.set_max(4);
        assert_eq!(tracker.index(), 4);
        assert_eq!(tracker.remaining(), 0);
        tracker.set_max(16);
        assert_eq!(tracker.remaining(), 12);
        assert!((tracker.percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn iter_over_sized_source_sets_bound() {
        let mut tracker = bounded(100);
        let mut seen_max = Vec::new();
        {
            let mut it = tracker.iter(vec!['a', 'b', 'c']);
            while let Some(_c) = it.next() {
                seen_max.push(it.tracker().max());
            }
        }
        assert_eq!(seen_max, [3, 3, 3]);
        assert_eq!(tracker.index(), 3);
        assert!((tracker.percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(tracker.phase(), Phase::Finished);
    }

    #[test]
    fn iter_over_unsized_source_keeps_bound() {
        let mut tracker = bounded(50);
        let n = tracker.iter(std::iter::successors(Some(1u32), |x| (*x < 8).then(|| x + 1))).count();
        assert_eq!(n, 8);
        assert_eq!(tracker.max(), 50);
        assert_eq!(tracker.index(), 8);
        assert_eq!(tracker.remaining(), 42);
    }
}
