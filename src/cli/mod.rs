//! CLI command implementations
//!
//! Each subcommand of `pal` has a `run` function here. Commands print
//! user-facing output to stdout; diagnostics go through `tracing` to stderr.

pub mod init;
pub mod list;
pub mod prompt;
pub mod resolve;
pub mod run;
pub mod serve;
