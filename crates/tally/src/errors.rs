//! Error handling and exit codes.

use tally_cli::TemplateError;
use tally_core::constants::exit_codes;
use tally_core::ConfigError;

/// Map an application error to the process exit code.
///
/// The first configuration or I/O error found in the chain decides.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() || cause.is::<TemplateError>() {
            return exit_codes::ERROR_CONFIG;
        }
        if cause.is::<std::io::Error>() {
            return exit_codes::ERROR_IO;
        }
    }
    exit_codes::ERROR_GENERIC
}
