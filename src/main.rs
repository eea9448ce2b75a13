//! Cuantizar CLI
//!
//! # Usage
//!
//! ```bash
//! # Check a quantizer config
//! cuantizar validate quantizer.yaml
//!
//! # Quantize encoder latents
//! cuantizar encode quantizer.yaml --input latents.json --output codes.json
//!
//! # Fit a codebook and keep it
//! cuantizar fit quantizer.yaml --input latents.json --save codebook.json
//! ```
//!
//! Diagnostics go to stderr through `tracing`; `RUST_LOG` overrides the
//! level chosen by `--verbose`.

use clap::Parser;
use cuantizar::cli::{run_command, Cli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "cuantizar=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
