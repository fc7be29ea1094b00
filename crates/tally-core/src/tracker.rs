//! The capability shared by both tracker kinds, and the lazy iterator
//! adapter built on it.

use std::iter::FusedIterator;
use std::time::Duration;

use crate::snapshot::Snapshot;

/// Lifecycle position of a tracker.
///
/// `Finished` is advisory: a finished tracker still accepts updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Started,
    Advancing,
    Finished,
}

impl Phase {
    /// Phase after a statistics update. `Finished` is terminal.
    #[must_use]
    pub(crate) fn advanced(self) -> Self {
        match self {
            Phase::Finished => Phase::Finished,
            _ => Phase::Advancing,
        }
    }
}

/// Step counter with timing statistics.
pub trait Tracker {
    /// Current step count.
    fn index(&self) -> u64;

    /// Moving average of seconds per step.
    fn avg(&self) -> f64;

    /// Time since creation, truncated to whole seconds.
    fn elapsed_td(&self) -> Duration;

    /// Whole seconds since creation.
    fn elapsed(&self) -> u64 {
        self.elapsed_td().as_secs()
    }

    /// Lifecycle position.
    fn phase(&self) -> Phase;

    /// Read model at this instant.
    fn snapshot(&self) -> Snapshot;

    /// Establish the initial displayed state.
    fn start(&mut self);

    /// Move the counter by `n` steps and notify the hook.
    fn advance(&mut self, n: i64);

    /// Shorthand for `advance(1)`.
    fn step(&mut self) {
        self.advance(1);
    }

    /// Mark the operation done and notify the hook.
    fn finish(&mut self);

    /// Called by [`Tracked`] before the first element is pulled, with the
    /// exact length of the source when it reports one.
    fn observe_len(&mut self, _len: Option<u64>) {}

    /// Wrap `source` so that every consumed element advances the tracker.
    fn iter<I>(&mut self, source: I) -> Tracked<'_, Self, I::IntoIter>
    where
        Self: Sized,
        I: IntoIterator,
    {
        Tracked::new(self, source.into_iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Yielded,
    Done,
}

/// Iterator adapter returned by [`Tracker::iter`].
///
/// An element counts as processed once the consumer asks for the next
/// one, so the step for element `k` is recorded when element `k + 1` is
/// requested. When the source runs dry the pending step is recorded and
/// the tracker is finished exactly once.
pub struct Tracked<'a, T: Tracker + ?Sized, I> {
    tracker: &'a mut T,
    source: I,
    state: State,
}

impl<'a, T: Tracker + ?Sized, I: Iterator> Tracked<'a, T, I> {
    pub fn new(tracker: &'a mut T, source: I) -> Self {
        Self {
            tracker,
            source,
            state: State::Fresh,
        }
    }

    /// Read access to the tracker between elements.
    pub fn tracker(&self) -> &T {
        self.tracker
    }
}

/// Length of `iter` if its size hint is exact.
fn exact_len<I: Iterator>(iter: &I) -> Option<u64> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => u64::try_from(lower).ok(),
        _ => None,
    }
}

impl<T: Tracker + ?Sized, I: Iterator> Iterator for Tracked<'_, T, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Done => return None,
            State::Fresh => {
                let len = exact_len(&self.source);
                self.tracker.observe_len(len);
            }
            State::Yielded => self.tracker.advance(1),
        }

        if let Some(item) = self.source.next() {
            self.state = State::Yielded;
            Some(item)
        } else {
            self.state = State::Done;
            self.tracker.finish();
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            State::Done => (0, Some(0)),
            _ => self.source.size_hint(),
        }
    }
}

impl<T: Tracker + ?Sized, I: Iterator> FusedIterator for Tracked<'_, T, I> {}

impl<T: Tracker + ?Sized, I> std::fmt::Debug for Tracked<'_, T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracked")
            .field("index", &self.tracker.index())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Signed difference `to - from`, saturating at the `i64` range.
pub(crate) fn signed_delta(from: u64, to: u64) -> i64 {
    if to >= from {
        i64::try_from(to - from).unwrap_or(i64::MAX)
    } else {
        i64::try_from(from - to).map_or(i64::MIN, |d| -d)
    }
}
