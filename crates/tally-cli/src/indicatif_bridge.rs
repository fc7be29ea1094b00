//! Drive an `indicatif` progress bar from tracker updates.

use indicatif::{ProgressBar, ProgressStyle};
use tally_core::{Snapshot, UpdateHook};

use crate::output::{format_clock, format_rate};

const BAR_TEMPLATE: &str = "{prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}";
const SPINNER_TEMPLATE: &str = "{prefix} {spinner} {pos} {msg}";

/// Bar message built from the tracker's own statistics.
fn status_message(snapshot: &Snapshot) -> String {
    match (snapshot.percent(), snapshot.eta_td()) {
        (Some(percent), Some(eta)) => format!("({percent:>3.0}%) ETA: {}", format_clock(eta)),
        _ => format!("[{}] {}", format_clock(snapshot.elapsed_td()), format_rate(snapshot.avg)),
    }
}

/// Forwards snapshots to an [`indicatif::ProgressBar`].
///
/// The bar starts as a spinner and switches to a bounded style the first
/// time it sees a snapshot with a bound, or whenever the bound changes.
/// Percent, ETA and rate come from the snapshot, not from indicatif's own
/// estimator.
pub struct IndicatifHook {
    bar: ProgressBar,
}

impl IndicatifHook {
    /// A bar drawn on stderr.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(prefix.to_string());
        Self::with_bar(bar)
    }

    /// Wrap an existing bar, e.g. one owned by a `MultiProgress`.
    #[must_use]
    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    #[must_use]
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl UpdateHook for IndicatifHook {
    fn on_update(&mut self, snapshot: &Snapshot) {
        match snapshot.max() {
            Some(max) => {
                if self.bar.length() != Some(max) {
                    self.bar.set_length(max);
                    self.bar.set_style(
                        ProgressStyle::with_template(BAR_TEMPLATE)
                            .map(|style| style.progress_chars("#>-"))
                            .unwrap_or_else(|_| ProgressStyle::default_bar()),
                    );
                }
                self.bar.set_message(status_message(snapshot));
                self.bar.set_position(snapshot.index);
            }
            None => {
                self.bar.set_message(status_message(snapshot));
                self.bar.set_position(snapshot.index);
                self.bar.tick();
            }
        }
    }

    fn on_finish(&mut self, snapshot: &Snapshot) {
        self.bar.set_message(status_message(snapshot));
        self.bar.set_position(snapshot.index);
        self.bar.finish();
    }
}

impl std::fmt::Debug for IndicatifHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatifHook")
            .field("position", &self.bar.position())
            .field("length", &self.bar.length())
            .finish()
    }
}
