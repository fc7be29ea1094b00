//! # tally-core
//!
//! Progress statistics engine. Trackers count completed steps, keep a
//! moving average of the time each step takes and, when the total is
//! known, project the time remaining. Rendering is left to an
//! [`UpdateHook`] that receives a [`Snapshot`] after every update.
//!
//! ```
//! use tally_core::{BoundedTracker, Tracker};
//!
//! let mut tracker = BoundedTracker::new();
//! let total: u32 = tracker.iter(0..4u32).sum();
//! assert_eq!(total, 6);
//! assert_eq!(tracker.max(), 4);
//! assert_eq!(tracker.index(), 4);
//! assert_eq!(tracker.remaining(), 0);
//! ```

pub mod bounded;
pub mod clock;
pub mod config;
pub mod constants;
pub mod field;
pub mod hook;
pub mod snapshot;
pub(crate) mod stats;
pub mod tracker;
pub mod unbounded;

// Re-exports
pub use bounded::BoundedTracker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};
pub use constants::{DEFAULT_MAX, PROGRESS_REPORT_THRESHOLD};
pub use field::{Field, UnknownField, Value};
pub use hook::{LoggingHook, NoOpHook, UpdateHook};
pub use snapshot::{BoundStats, Snapshot};
pub use stats::incremental_mean;
pub use tracker::{Phase, Tracked, Tracker};
pub use unbounded::UnboundedTracker;
