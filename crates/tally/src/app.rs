//! Application entry point and dispatch.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info};

use tally_cli::output::{format_duration, format_number, format_rate};
use tally_cli::{build_hook, ui, Template};
use tally_core::{BoundedTracker, Tracker, TrackerConfig, UnboundedTracker};

use crate::config::{AppConfig, Command, DemoArgs, PipeArgs};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        tally_cli::completion::generate_completion(&mut cmd, shell, &mut io::stdout());
        return Ok(());
    }

    match &config.command {
        Some(Command::Demo(args)) => run_demo(args),
        Some(Command::Pipe(args)) => run_pipe(args),
        None => anyhow::bail!("no command given, see `tally --help`"),
    }
}

fn compile_suffix(template: Option<&str>) -> Result<Option<Template>> {
    template
        .map(|source| Template::compile(source).with_context(|| format!("template `{source}`")))
        .transpose()
}

fn run_demo(args: &DemoArgs) -> Result<()> {
    let config = args.tracker_config()?;
    let suffix = compile_suffix(args.template.as_deref())?;
    let hook = build_hook(args.style, Box::new(io::stderr()), &args.prefix, suffix);
    debug!(?config, style = ?args.style, delay = ?args.delay, "Starting demo");

    ui::print_header("tally demo");
    let started = Instant::now();
    let (steps, avg) = if args.unbounded {
        let mut tracker = UnboundedTracker::with_config(&config).with_boxed_hook(hook);
        let steps = config.max.saturating_sub(config.index);
        demo_unbounded(&mut tracker, steps, args.delay);
        (tracker.index(), tracker.avg())
    } else {
        let mut tracker = BoundedTracker::with_config(&config).with_boxed_hook(hook);
        demo_bounded(&mut tracker, args.delay);
        (tracker.index(), tracker.avg())
    };

    ui::print_success(&format!(
        "{} steps in {} ({})",
        format_number(steps),
        format_duration(started.elapsed()),
        format_rate(avg)
    ));
    Ok(())
}

/// Drive `tracker` through the iterator adapter for `steps` elements.
fn demo_unbounded(tracker: &mut UnboundedTracker, steps: u64, delay: Duration) {
    tracker.start();
    for _ in tracker.iter(0..steps) {
        thread::sleep(delay);
    }
}

/// Step `tracker` up to its bound, rewinding once halfway when it allows
/// backtracking.
fn demo_bounded(tracker: &mut BoundedTracker, delay: Duration) {
    tracker.start();
    let halfway = tracker.index() + tracker.remaining() / 2;
    let mut rewound = !tracker.backtrack();
    while tracker.remaining() > 0 {
        thread::sleep(delay);
        if !rewound && tracker.index() >= halfway {
            rewound = true;
            let target = tracker.index() / 2;
            info!(from = tracker.index(), to = target, "Rewinding");
            tracker.goto(target);
        } else {
            tracker.step();
        }
    }
    tracker.finish();
}

fn run_pipe(args: &PipeArgs) -> Result<()> {
    let suffix = compile_suffix(args.template.as_deref())?;
    let hook = build_hook(args.style, Box::new(io::stderr()), &args.prefix, suffix);
    let input = io::stdin().lock();
    let mut output = io::BufWriter::new(io::stdout().lock());

    let lines = match args.max {
        Some(max) => {
            let config = TrackerConfig::default().with_max(max);
            let mut tracker = BoundedTracker::with_config(&config).with_boxed_hook(hook);
            copy_lines(&mut tracker, input, &mut output)
        }
        None => {
            let mut tracker = UnboundedTracker::new().with_boxed_hook(hook);
            copy_lines(&mut tracker, input, &mut output)
        }
    }
    .context("copying stdin to stdout")?;

    debug!(lines, "Pipe finished");
    Ok(())
}

/// Copy `input` to `output` line by line, advancing `tracker` once per line.
///
/// Returns the number of lines copied. The tracker is finished on both
/// the success and the error path.
pub fn copy_lines<T: Tracker>(
    tracker: &mut T,
    input: impl BufRead,
    output: &mut impl Write,
) -> io::Result<u64> {
    tracker.start();
    let mut copied = 0;
    let mut failed = None;
    for line in tracker.iter(input.lines()) {
        if let Err(e) = line.and_then(|line| writeln!(output, "{line}")) {
            failed = Some(e);
            break;
        }
        copied += 1;
    }
    if let Some(e) = failed {
        tracker.finish();
        return Err(e);
    }
    output.flush()?;
    Ok(copied)
}
