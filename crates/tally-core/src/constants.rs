//! Defaults shared by trackers and hooks.

/// Bound used by a bounded tracker when none is configured.
pub const DEFAULT_MAX: u64 = 100;

/// Minimum progress change (1%) before a throttled hook reports again.
pub const PROGRESS_REPORT_THRESHOLD: f64 = 0.01;

/// Minimum interval between two throttled log lines.
pub const DEFAULT_LOG_INTERVAL_MS: u64 = 500;

/// Process exit codes used by the `tally` binary.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ERROR_GENERIC: i32 = 1;
    pub const ERROR_CONFIG: i32 = 4;
    pub const ERROR_IO: i32 = 5;
}
