//! tally: progress tracking demo and line-counting pipe.

use tally_cli::ui;
use tally_lib::{app, config, errors};
use tracing::Level;

fn main() {
    let config = config::AppConfig::parse();

    let level = if config.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = app::run(&config) {
        ui::print_error(&format!("{err:#}"));
        std::process::exit(errors::exit_code_for(&err));
    }
}
