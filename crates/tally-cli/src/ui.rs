//! Styled console messages.

use console::style;

/// Check if color output is disabled via `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

/// Print a styled header to stderr.
pub fn print_header(text: &str) {
    if is_color_disabled() {
        eprintln!("=== {text} ===");
    } else {
        eprintln!("{}", style(format!("=== {text} ===")).bold().cyan());
    }
}

/// Print a success message to stderr.
pub fn print_success(text: &str) {
    if is_color_disabled() {
        eprintln!("[OK] {text}");
    } else {
        eprintln!("{} {text}", style("[OK]").green().bold());
    }
}

/// Print an error message to stderr.
pub fn print_error(text: &str) {
    if is_color_disabled() {
        eprintln!("[ERROR] {text}");
    } else {
        eprintln!("{} {text}", style("[ERROR]").red().bold());
    }
}
