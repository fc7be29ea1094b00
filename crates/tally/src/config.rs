//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tally_cli::RenderStyle;
use tally_core::{ConfigError, TrackerConfig};

/// Progress tracking with moving-average rate and ETA estimation.
#[derive(Parser, Debug)]
#[command(name = "tally", version, about, arg_required_else_help = true)]
pub struct AppConfig {
    /// Verbose output (debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulated workload with a live progress display.
    Demo(DemoArgs),
    /// Copy stdin to stdout, one step per line, drawing progress on stderr.
    Pipe(PipeArgs),
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of steps; sets the bound of a bounded tracker.
    #[arg(short = 'n', long)]
    pub steps: Option<u64>,

    /// Pause between steps (e.g., "50ms", "1s").
    #[arg(long, default_value = "50ms", env = "TALLY_DELAY", value_parser = parse_delay)]
    pub delay: Duration,

    /// Display style.
    #[arg(long, value_enum, default_value_t = RenderStyle::Bar)]
    pub style: RenderStyle,

    /// Track without a bound.
    #[arg(long)]
    pub unbounded: bool,

    /// Allow the tracker to move backwards, and rewind once halfway.
    #[arg(long)]
    pub backtrack: bool,

    /// JSON file with `index`, `max` and `backtrack`.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration override, repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Suffix template, e.g. "{percent:.0}% eta {eta_td}".
    #[arg(long)]
    pub template: Option<String>,

    /// Text shown before the progress display.
    #[arg(long, default_value = "Working")]
    pub prefix: String,
}

impl DemoArgs {
    /// Resolve the tracker configuration.
    ///
    /// Later sources win: defaults, then the JSON file, then `--set`
    /// overrides, then `--steps` and `--backtrack`.
    pub fn tracker_config(&self) -> Result<TrackerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::load(path)?,
            None => TrackerConfig::default(),
        };
        for spec in &self.overrides {
            config.apply_override(spec)?;
        }
        if let Some(steps) = self.steps {
            config = config.with_max(steps);
        }
        if self.backtrack {
            config = config.with_backtrack(true);
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct PipeArgs {
    /// Expected number of lines; without it the tracker is unbounded.
    #[arg(long)]
    pub max: Option<u64>,

    /// Display style.
    #[arg(long, value_enum, default_value_t = RenderStyle::Counter)]
    pub style: RenderStyle,

    /// Suffix template.
    #[arg(long)]
    pub template: Option<String>,

    /// Text shown before the progress display.
    #[arg(long, default_value = "Lines")]
    pub prefix: String,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    parse_duration(s).ok_or_else(|| format!("invalid duration `{s}`"))
}

/// Parse a duration string like "50ms", "2s", "1m".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n * 60))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_millis(n))
    }
}
