//! CLI: argument definitions, logging helpers and command handlers.

mod args;
mod commands;
mod logging;

pub use args::{parse_args, Cli, Command};
pub use commands::run_command;
pub use logging::{log, LogLevel};
