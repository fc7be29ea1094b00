//! Field names of the tracker read model and their values.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A named attribute a template can interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Index,
    Elapsed,
    ElapsedTd,
    Avg,
    Max,
    Remaining,
    Progress,
    Percent,
    Eta,
    EtaTd,
}

impl Field {
    /// Every field, in display order.
    pub const ALL: [Field; 10] = [
        Field::Index,
        Field::Elapsed,
        Field::ElapsedTd,
        Field::Avg,
        Field::Max,
        Field::Remaining,
        Field::Progress,
        Field::Percent,
        Field::Eta,
        Field::EtaTd,
    ];

    /// The lookup key for this field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Field::Index => "index",
            Field::Elapsed => "elapsed",
            Field::ElapsedTd => "elapsed_td",
            Field::Avg => "avg",
            Field::Max => "max",
            Field::Remaining => "remaining",
            Field::Progress => "progress",
            Field::Percent => "percent",
            Field::Eta => "eta",
            Field::EtaTd => "eta_td",
        }
    }

    /// Whether the field only exists on bounded trackers.
    #[must_use]
    pub fn is_bounded_only(self) -> bool {
        !matches!(
            self,
            Field::Index | Field::Elapsed | Field::ElapsedTd | Field::Avg
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Value of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(u64),
    Float(f64),
    Duration(Duration),
}

impl Value {
    /// Integer view; floats are truncated, durations give whole seconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn as_u64(self) -> u64 {
        match self {
            Value::Int(v) => v,
            Value::Float(v) => v.max(0.0) as u64,
            Value::Duration(d) => d.as_secs(),
        }
    }

    /// Floating point view; durations give seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
            Value::Duration(d) => d.as_secs_f64(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => fmt::Display::fmt(v, f),
            Value::Float(v) => fmt::Display::fmt(v, f),
            Value::Duration(d) => {
                let secs = d.as_secs();
                write!(f, "{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>(), Ok(field));
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "speed".parse::<Field>().unwrap_err();
        assert_eq!(err.to_string(), "unknown field `speed`");
    }

    #[test]
    fn bounded_only_fields() {
        assert!(!Field::Index.is_bounded_only());
        assert!(!Field::Avg.is_bounded_only());
        assert!(Field::Eta.is_bounded_only());
        assert!(Field::Percent.is_bounded_only());
    }

    #[test]
    fn duration_renders_as_clock() {
        let v = Value::Duration(Duration::from_secs(3725));
        assert_eq!(v.to_string(), "1:02:05");
        assert_eq!(Value::Duration(Duration::ZERO).to_string(), "0:00:00");
    }

    #[test]
    fn float_honours_precision() {
        assert_eq!(format!("{:.1}", Value::Float(42.26)), "42.3");
        assert_eq!(format!("{:>5}", Value::Int(7)), "    7");
    }

    #[test]
    fn numeric_views() {
        assert_eq!(Value::Float(2.9).as_u64(), 2);
        assert_eq!(Value::Float(-1.0).as_u64(), 0);
        assert_eq!(Value::Duration(Duration::from_millis(1500)).as_u64(), 1);
        assert!((Value::Int(3).as_f64() - 3.0).abs() < f64::EPSILON);
    }
}
