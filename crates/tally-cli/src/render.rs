//! Line renderers driven by tracker updates.
//!
//! Each renderer redraws a single terminal line with a carriage return on
//! every update and ends it with a newline when the tracker finishes.

use std::io::{self, Write};
use std::time::Duration;

use tally_core::constants::DEFAULT_LOG_INTERVAL_MS;
use tally_core::{LoggingHook, Snapshot, UpdateHook};
use tracing::warn;

use crate::indicatif_bridge::IndicatifHook;
use crate::template::Template;

/// Destination of rendered lines.
pub type Sink = Box<dyn Write + Send>;

/// Suffix shown by [`BarRenderer`] unless another one is set.
pub const DEFAULT_BAR_SUFFIX: &str = "{index}/{max}";

/// Rendering style selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RenderStyle {
    #[default]
    Bar,
    Counter,
    Spinner,
    Indicatif,
    /// Throttled `tracing` events instead of a drawn line.
    Log,
}

/// Build a renderer for `style`.
///
/// The `indicatif` and `log` styles do not write to `out`.
#[must_use]
pub fn build_hook(
    style: RenderStyle,
    out: Sink,
    prefix: &str,
    suffix: Option<Template>,
) -> Box<dyn UpdateHook> {
    match style {
        RenderStyle::Bar => {
            let mut bar = BarRenderer::new(out).with_prefix(prefix);
            if let Some(suffix) = suffix {
                bar = bar.with_suffix(suffix);
            }
            Box::new(bar)
        }
        RenderStyle::Counter => {
            let mut counter = CounterRenderer::new(out).with_prefix(prefix);
            if let Some(suffix) = suffix {
                counter = counter.with_suffix(suffix);
            }
            Box::new(counter)
        }
        RenderStyle::Spinner => {
            let mut spinner = SpinnerRenderer::new(out).with_prefix(prefix);
            if let Some(suffix) = suffix {
                spinner = spinner.with_suffix(suffix);
            }
            Box::new(spinner)
        }
        RenderStyle::Indicatif => Box::new(IndicatifHook::new(prefix)),
        RenderStyle::Log => {
            let label = if prefix.is_empty() { "progress" } else { prefix };
            Box::new(LoggingHook::new(
                label,
                Duration::from_millis(DEFAULT_LOG_INTERVAL_MS),
            ))
        }
    }
}

/// A redrawable terminal line.
struct Line {
    out: Sink,
    last_width: usize,
    last_error: Option<io::Error>,
}

impl Line {
    fn new(out: Sink) -> Self {
        Self {
            out,
            last_width: 0,
            last_error: None,
        }
    }

    fn draw(&mut self, text: &str) {
        let width = console::measure_text_width(text);
        let pad = " ".repeat(self.last_width.saturating_sub(width));
        let result = write!(self.out, "\r{text}{pad}").and_then(|()| self.out.flush());
        self.last_width = width;
        self.record(result);
    }

    fn end(&mut self) {
        let result = writeln!(self.out).and_then(|()| self.out.flush());
        self.last_width = 0;
        self.record(result);
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                warn!(error = %e, "Progress output failed");
            }
            self.last_error = Some(e);
        }
    }
}

fn join(prefix: &str, body: &str) -> String {
    match (prefix.is_empty(), body.is_empty()) {
        (true, _) => body.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix} {body}"),
    }
}

/// `prefix |#####-----| suffix`
pub struct BarRenderer {
    line: Line,
    prefix: String,
    suffix: Template,
    width: usize,
    fill: char,
    empty: char,
}

impl BarRenderer {
    pub const DEFAULT_WIDTH: usize = 32;

    #[must_use]
    pub fn new(out: Sink) -> Self {
        Self {
            line: Line::new(out),
            prefix: String::new(),
            suffix: Template::compile(DEFAULT_BAR_SUFFIX).unwrap_or_default(),
            width: Self::DEFAULT_WIDTH,
            fill: '#',
            empty: '-',
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: Template) -> Self {
        self.suffix = suffix;
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_chars(mut self, fill: char, empty: char) -> Self {
        self.fill = fill;
        self.empty = empty;
        self
    }

    /// The most recent write error, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&io::Error> {
        self.line.last_error.as_ref()
    }

    /// Text of the line for `snapshot`.
    ///
    /// Without a bound there is nothing to fill, so the index is shown.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn render_line(&self, snapshot: &Snapshot) -> String {
        let Some(progress) = snapshot.progress() else {
            return join(&self.prefix, &snapshot.index.to_string());
        };
        let filled = ((progress * self.width as f64) as usize).min(self.width);
        let bar: String = std::iter::repeat(self.fill)
            .take(filled)
            .chain(std::iter::repeat(self.empty).take(self.width - filled))
            .collect();
        let body = format!("|{bar}| {}", self.suffix.render(snapshot));
        join(&self.prefix, body.trim_end())
    }
}

impl UpdateHook for BarRenderer {
    fn on_update(&mut self, snapshot: &Snapshot) {
        let text = self.render_line(snapshot);
        self.line.draw(&text);
    }

    fn on_finish(&mut self, snapshot: &Snapshot) {
        self.on_update(snapshot);
        self.line.end();
    }
}

/// `prefix 42 suffix`
pub struct CounterRenderer {
    line: Line,
    prefix: String,
    suffix: Option<Template>,
}

impl CounterRenderer {
    #[must_use]
    pub fn new(out: Sink) -> Self {
        Self {
            line: Line::new(out),
            prefix: String::new(),
            suffix: None,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: Template) -> Self {
        self.suffix = Some(suffix);
        self
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&io::Error> {
        self.line.last_error.as_ref()
    }

    #[must_use]
    pub fn render_line(&self, snapshot: &Snapshot) -> String {
        let mut body = snapshot.index.to_string();
        if let Some(suffix) = &self.suffix {
            body.push(' ');
            body.push_str(&suffix.render(snapshot));
        }
        join(&self.prefix, body.trim_end())
    }
}

impl UpdateHook for CounterRenderer {
    fn on_update(&mut self, snapshot: &Snapshot) {
        let text = self.render_line(snapshot);
        self.line.draw(&text);
    }

    fn on_finish(&mut self, snapshot: &Snapshot) {
        self.on_update(snapshot);
        self.line.end();
    }
}

/// `prefix / suffix`, cycling the phase on every update.
pub struct SpinnerRenderer {
    line: Line,
    prefix: String,
    suffix: Option<Template>,
    phases: &'static [&'static str],
    pos: usize,
}

impl SpinnerRenderer {
    pub const DEFAULT_PHASES: &'static [&'static str] = &["-", "\\", "|", "/"];

    #[must_use]
    pub fn new(out: Sink) -> Self {
        Self {
            line: Line::new(out),
            prefix: String::new(),
            suffix: None,
            phases: Self::DEFAULT_PHASES,
            pos: 0,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: Template) -> Self {
        self.suffix = Some(suffix);
        self
    }

    /// Replace the animation frames. An empty slice keeps the defaults.
    #[must_use]
    pub fn with_phases(mut self, phases: &'static [&'static str]) -> Self {
        if !phases.is_empty() {
            self.phases = phases;
        }
        self
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&io::Error> {
        self.line.last_error.as_ref()
    }

    /// Frame shown by the next draw.
    #[must_use]
    pub fn phase(&self) -> &'static str {
        self.phases[self.pos % self.phases.len()]
    }

    #[must_use]
    pub fn render_line(&self, snapshot: &Snapshot) -> String {
        let mut body = self.phase().to_string();
        if let Some(suffix) = &self.suffix {
            body.push(' ');
            body.push_str(&suffix.render(snapshot));
        }
        join(&self.prefix, body.trim_end())
    }
}

impl UpdateHook for SpinnerRenderer {
    fn on_update(&mut self, snapshot: &Snapshot) {
        let text = self.render_line(snapshot);
        self.line.draw(&text);
        self.pos = (self.pos + 1) % self.phases.len();
    }

    fn on_finish(&mut self, _snapshot: &Snapshot) {
        self.line.end();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use tally_core::{BoundStats, BoundedTracker, Tracker, TrackerConfig, UnboundedTracker};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn snapshot(index: u64, max: u64) -> Snapshot {
        #[allow(clippy::cast_precision_loss)]
        let progress = index as f64 / max as f64;
        Snapshot {
            index,
            elapsed: 0,
            avg: 0.0,
            bound: Some(BoundStats {
                max,
                remaining: max - index,
                progress,
                percent: progress * 100.0,
                eta: 0,
            }),
        }
    }

    #[test]
    fn bar_line_fills_proportionally() {
        let bar = BarRenderer::new(Box::new(io::sink())).with_width(8);
        assert_eq!(bar.render_line(&snapshot(3, 8)), "|###-----| 3/8");
        assert_eq!(bar.render_line(&snapshot(8, 8)), "|########| 8/8");
        assert_eq!(bar.render_line(&snapshot(0, 8)), "|--------| 0/8");
    }

    #[test]
    fn bar_prefix_chars_and_suffix() {
        let bar = BarRenderer::new(Box::new(io::sink()))
            .with_width(4)
            .with_chars('=', ' ')
            .with_prefix("Copying")
            .with_suffix(Template::compile("{percent:.0}%").unwrap());
        assert_eq!(bar.render_line(&snapshot(2, 4)), "Copying |==  | 50%");
    }

    #[test]
    fn bar_without_bound_shows_index() {
        let bar = BarRenderer::new(Box::new(io::sink())).with_prefix("Lines");
        let s = Snapshot {
            index: 17,
            elapsed: 0,
            avg: 0.0,
            bound: None,
        };
        assert_eq!(bar.render_line(&s), "Lines 17");
    }

    #[test]
    fn bar_redraws_and_ends_line() {
        let buffer = Buffer::default();
        let bar = BarRenderer::new(Box::new(buffer.clone())).with_width(4);
        let mut tracker = BoundedTracker::with_config(&TrackerConfig::default().with_max(2))
            .with_hook(bar);
        tracker.start();
        tracker.step();
        tracker.step();
        tracker.finish();
        let out = buffer.contents();
        assert!(out.starts_with("\r|----| 0/2"));
        assert!(out.contains("\r|##--| 1/2"));
        assert!(out.ends_with("\r|####| 2/2\n"));
    }

    #[test]
    fn shorter_line_clears_leftovers() {
        let buffer = Buffer::default();
        let mut counter = CounterRenderer::new(Box::new(buffer.clone()))
            .with_suffix(Template::compile("{max}").unwrap());
        counter.on_update(&snapshot(1, 100));
        counter.on_update(&Snapshot {
            index: 2,
            elapsed: 0,
            avg: 0.0,
            bound: None,
        });
        assert_eq!(buffer.contents(), "\r1 100\r2    ");
    }

    #[test]
    fn counter_over_unbounded_tracker() {
        let buffer = Buffer::default();
        let counter = CounterRenderer::new(Box::new(buffer.clone())).with_prefix("Processed");
        let mut tracker = UnboundedTracker::new().with_hook(counter);
        let n = tracker.iter(0..3).count();
        assert_eq!(n, 3);
        let out = buffer.contents();
        assert!(out.contains("\rProcessed 1"));
        assert!(out.ends_with("\rProcessed 3\n"));
    }

    #[test]
    fn spinner_cycles_phases() {
        let buffer = Buffer::default();
        let mut spinner = SpinnerRenderer::new(Box::new(buffer.clone()))
            .with_prefix("Working")
            .with_phases(&["a", "b"]);
        let s = snapshot(1, 4);
        assert_eq!(spinner.phase(), "a");
        spinner.on_update(&s);
        assert_eq!(spinner.phase(), "b");
        spinner.on_update(&s);
        spinner.on_update(&s);
        spinner.on_finish(&s);
        assert_eq!(buffer.contents(), "\rWorking a\rWorking b\rWorking a\n");
    }

    #[test]
    fn write_errors_are_recorded() {
        let mut bar = BarRenderer::new(Box::new(Broken));
        assert!(bar.last_error().is_none());
        bar.on_update(&snapshot(1, 2));
        bar.on_finish(&snapshot(2, 2));
        assert_eq!(bar.last_error().map(ToString::to_string), Some("closed".to_string()));
    }

    #[test]
    fn build_hook_for_every_style() {
        for style in [
            RenderStyle::Bar,
            RenderStyle::Counter,
            RenderStyle::Spinner,
            RenderStyle::Indicatif,
            RenderStyle::Log,
        ] {
            let mut hook = build_hook(style, Box::new(io::sink()), "x", None);
            hook.on_update(&snapshot(1, 2));
            hook.on_finish(&snapshot(2, 2));
        }
    }

    #[test]
    fn default_style_is_bar() {
        assert_eq!(RenderStyle::default(), RenderStyle::Bar);
    }
}
