//! Read model handed to update hooks.

use std::time::Duration;

use crate::field::{Field, Value};

/// Statistics that only exist when the total is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundStats {
    /// Step count representing completion.
    pub max: u64,
    /// Steps left until `max`.
    pub remaining: u64,
    /// Completion as a fraction in [0.0, 1.0].
    pub progress: f64,
    /// Completion as a percentage in [0.0, 100.0].
    pub percent: f64,
    /// Projected seconds until `max` at the current average.
    pub eta: u64,
}

/// Point-in-time view of a tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Current step count.
    pub index: u64,
    /// Whole seconds since the tracker was created.
    pub elapsed: u64,
    /// Moving average of seconds per step.
    pub avg: f64,
    /// Bound-derived statistics, `None` for unbounded trackers.
    pub bound: Option<BoundStats>,
}

impl Snapshot {
    /// Whether the snapshot comes from a bounded tracker.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.bound.is_some()
    }

    /// Whole seconds since creation, as a duration.
    #[must_use]
    pub fn elapsed_td(&self) -> Duration {
        Duration::from_secs(self.elapsed)
    }

    /// Bound, if any.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        self.bound.map(|b| b.max)
    }

    /// Steps left until the bound.
    #[must_use]
    pub fn remaining(&self) -> Option<u64> {
        self.bound.map(|b| b.remaining)
    }

    /// Completion as a fraction in [0.0, 1.0].
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        self.bound.map(|b| b.progress)
    }

    /// Completion as a percentage.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        self.bound.map(|b| b.percent)
    }

    /// Projected whole seconds until the bound.
    #[must_use]
    pub fn eta(&self) -> Option<u64> {
        self.bound.map(|b| b.eta)
    }

    /// Projected time until the bound.
    #[must_use]
    pub fn eta_td(&self) -> Option<Duration> {
        self.eta().map(Duration::from_secs)
    }

    /// Value of `field`, or `None` when this snapshot does not carry it.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<Value> {
        match field {
            Field::Index => Some(Value::Int(self.index)),
            Field::Elapsed => Some(Value::Int(self.elapsed)),
            Field::ElapsedTd => Some(Value::Duration(self.elapsed_td())),
            Field::Avg => Some(Value::Float(self.avg)),
            Field::Max => self.max().map(Value::Int),
            Field::Remaining => self.remaining().map(Value::Int),
            Field::Progress => self.progress().map(Value::Float),
            Field::Percent => self.percent().map(Value::Float),
            Field::Eta => self.eta().map(Value::Int),
            Field::EtaTd => self.eta_td().map(Value::Duration),
        }
    }

    /// String-keyed lookup for templates.
    ///
    /// Unknown and underscore-prefixed keys resolve to `None`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Value> {
        if key.starts_with('_') {
            return None;
        }
        key.parse::<Field>().ok().and_then(|field| self.get(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded() -> Snapshot {
        Snapshot {
            index: 7,
            elapsed: 65,
            avg: 0.5,
            bound: None,
        }
    }

    fn bounded() -> Snapshot {
        Snapshot {
            index: 25,
            elapsed: 10,
            avg: 0.4,
            bound: Some(BoundStats {
                max: 100,
                remaining: 75,
                progress: 0.25,
                percent: 25.0,
                eta: 30,
            }),
        }
    }

    #[test]
    fn unbounded_exposes_common_fields() {
        let s = unbounded();
        assert_eq!(s.get(Field::Index), Some(Value::Int(7)));
        assert_eq!(
            s.get(Field::ElapsedTd),
            Some(Value::Duration(Duration::from_secs(65)))
        );
        assert_eq!(s.get(Field::Avg), Some(Value::Float(0.5)));
    }

    #[test]
    fn unbounded_lacks_bound_fields() {
        let s = unbounded();
        for field in Field::ALL.into_iter().filter(|f| f.is_bounded_only()) {
            assert_eq!(s.get(field), None, "{field} should be absent");
        }
    }

    #[test]
    fn bounded_exposes_every_field() {
        let s = bounded();
        for field in Field::ALL {
            assert!(s.get(field).is_some(), "{field} should be present");
        }
        assert_eq!(s.lookup("eta_td"), Some(Value::Duration(Duration::from_secs(30))));
        assert_eq!(s.lookup("remaining"), Some(Value::Int(75)));
    }

    #[test]
    fn lookup_rejects_unknown_and_private_keys() {
        let s = bounded();
        assert_eq!(s.lookup("nonexistent"), None);
        assert_eq!(s.lookup("_ts"), None);
        assert_eq!(s.lookup("_index"), None);
        assert_eq!(s.lookup(""), None);
    }
}
