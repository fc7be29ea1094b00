//! Timing state shared by both tracker kinds.

use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

/// Fold `sample` into a running mean that already covers `count` samples.
///
/// A zero average is treated as "no sample yet" and is replaced outright.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn incremental_mean(avg: f64, sample: f64, count: u64) -> f64 {
    if avg == 0.0 {
        sample
    } else {
        let n = count as f64;
        (sample + n * avg) / (n + 1.0)
    }
}

/// Clock, start/last timestamps and the moving average.
pub(crate) struct Stats {
    clock: Box<dyn Clock>,
    start_ts: Instant,
    last_ts: Instant,
    avg: f64,
}

impl Stats {
    pub(crate) fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub(crate) fn with_clock(clock: Box<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            start_ts: now,
            last_ts: now,
            avg: 0.0,
        }
    }

    pub(crate) fn avg(&self) -> f64 {
        self.avg
    }

    /// Time since construction, truncated to whole seconds.
    pub(crate) fn elapsed(&self) -> Duration {
        Duration::from_secs(self.elapsed_precise().as_secs())
    }

    pub(crate) fn elapsed_precise(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start_ts)
    }

    /// Seconds since the previous lap; the lap mark moves to now.
    pub(crate) fn lap(&mut self) -> f64 {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last_ts);
        self.last_ts = now;
        dt.as_secs_f64()
    }

    pub(crate) fn fold(&mut self, sample: f64, count: u64) {
        self.avg = incremental_mean(self.avg, sample, count);
    }
}

impl std::fmt::Debug for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stats")
            .field("start_ts", &self.start_ts)
            .field("last_ts", &self.last_ts)
            .field("avg", &self.avg)
            .finish_non_exhaustive()
    }
}
