//! Update hooks: the collaborators a tracker notifies after each
//! statistics recomputation.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::constants::{DEFAULT_LOG_INTERVAL_MS, PROGRESS_REPORT_THRESHOLD};
use crate::snapshot::Snapshot;

/// Receiver of tracker updates.
pub trait UpdateHook: Send {
    /// Called after every statistics recomputation.
    fn on_update(&mut self, snapshot: &Snapshot);

    /// Called when the tracker is finished.
    fn on_finish(&mut self, _snapshot: &Snapshot) {}
}

impl<F> UpdateHook for F
where
    F: FnMut(&Snapshot) + Send,
{
    fn on_update(&mut self, snapshot: &Snapshot) {
        self(snapshot);
    }
}

/// Hook that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHook;

impl NoOpHook {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl UpdateHook for NoOpHook {
    fn on_update(&mut self, _snapshot: &Snapshot) {}
}

/// Hook that emits `tracing` events, throttled by time and by progress.
pub struct LoggingHook {
    clock: Box<dyn Clock>,
    label: String,
    min_interval: Duration,
    last_time: Option<Instant>,
    last_reported: f64,
}

impl LoggingHook {
    /// Create a logging hook that reports at most once per `min_interval`.
    #[must_use]
    pub fn new(label: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            clock: Box::new(SystemClock),
            label: label.into(),
            min_interval,
            last_time: None,
            last_reported: 0.0,
        }
    }

    /// Replace the clock used for interval throttling.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn interval_elapsed(&self, now: Instant) -> bool {
        self.last_time
            .map_or(true, |last| now.duration_since(last) >= self.min_interval)
    }
}

impl Default for LoggingHook {
    fn default() -> Self {
        Self::new("progress", Duration::from_millis(DEFAULT_LOG_INTERVAL_MS))
    }
}

impl UpdateHook for LoggingHook {
    fn on_update(&mut self, snapshot: &Snapshot) {
        let now = self.clock.now();
        if !self.interval_elapsed(now) {
            return;
        }

        match snapshot.bound {
            Some(bound) => {
                if (bound.progress - self.last_reported).abs() < PROGRESS_REPORT_THRESHOLD {
                    return;
                }
                debug!(
                    label = %self.label,
                    progress = format!("{:.1}%", bound.percent),
                    step = snapshot.index,
                    total = bound.max,
                    eta_secs = bound.eta,
                    "Progress update"
                );
                self.last_reported = bound.progress;
            }
            None => {
                debug!(
                    label = %self.label,
                    step = snapshot.index,
                    avg_secs = snapshot.avg,
                    "Progress update"
                );
            }
        }
        self.last_time = Some(now);
    }

    fn on_finish(&mut self, snapshot: &Snapshot) {
        info!(
            label = %self.label,
            steps = snapshot.index,
            elapsed_secs = snapshot.elapsed,
            "Progress complete"
        );
    }
}

impl std::fmt::Debug for LoggingHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingHook")
            .field("label", &self.label)
            .field("min_interval", &self.min_interval)
            .field("last_time", &self.last_time)
            .field("last_reported", &self.last_reported)
            .finish_non_exhaustive()
    }
}
