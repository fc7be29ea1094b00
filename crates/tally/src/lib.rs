//! tally library: command-line configuration and dispatch for the `tally` binary.

pub mod app;
pub mod config;
pub mod errors;
