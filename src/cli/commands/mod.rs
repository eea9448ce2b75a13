//! CLI command implementations

mod encode;
mod fit;
mod info;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Info(args) => info::run_info(args, log_level),
        Command::Encode(args) => encode::run_encode(args, log_level),
        Command::Fit(args) => fit::run_fit(args, log_level),
    }
}
