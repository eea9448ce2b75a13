//! Command-line front end
//!
//! Commands return `Result<(), String>`; `main` prints the error and sets the
//! exit code.

mod commands;
mod logging;

pub use commands::run_command;
pub use logging::LogLevel;

pub use crate::config::Cli;
