//! CLI argument parsing
//!
//! ```bash
//! cuantizar validate quantizer.yaml
//! cuantizar info quantizer.yaml
//! cuantizar encode quantizer.yaml --input latents.json --output codes.json
//! cuantizar fit quantizer.yaml --input latents.json --steps 200 --save codebook.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cuantizar: codebook quantization for vector-quantized autoencoders
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cuantizar")]
#[command(author = "PAIML")]
#[command(version)]
#[command(about = "Codebook quantization (VQ, Gumbel, residual) with a tape-based autograd core")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate a quantizer configuration
    Validate(ValidateArgs),

    /// Display information about a quantizer configuration
    Info(InfoArgs),

    /// Quantize a latent file into code indices
    Encode(EncodeArgs),

    /// Fit a codebook to a latent file
    Fit(FitArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the encode command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EncodeArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Latent file (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (JSON); printed to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Codebook snapshot to load instead of a random initialization
    #[arg(short, long)]
    pub codebook: Option<PathBuf>,

    /// Run in training mode (soft Gumbel samples)
    #[arg(long)]
    pub train: bool,

    /// Print a per-step timing report
    #[arg(long)]
    pub trace: bool,

    /// Override the configured random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the fit command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FitArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Latent file (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Override number of steps
    #[arg(short, long)]
    pub steps: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Save the fitted codebook snapshot
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Start from an existing codebook snapshot
    #[arg(short, long)]
    pub codebook: Option<PathBuf>,

    /// Override the configured random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parse arguments from an iterator (used by tests)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate_command() {
        let cli = parse_args(["cuantizar", "validate", "q.yaml"]).unwrap();
        match cli.command {
            Command::Validate(args) => assert_eq!(args.config, PathBuf::from("q.yaml")),
            _ => panic!("Expected Validate command"),
        }
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_encode_command() {
        let cli = parse_args([
            "cuantizar",
            "encode",
            "q.yaml",
            "--input",
            "latents.json",
            "--output",
            "codes.json",
            "--train",
            "--seed",
            "9",
        ])
        .unwrap();
        match cli.command {
            Command::Encode(args) => {
                assert_eq!(args.input, PathBuf::from("latents.json"));
                assert_eq!(args.output, Some(PathBuf::from("codes.json")));
                assert!(args.train);
                assert!(!args.trace);
                assert_eq!(args.seed, Some(9));
                assert_eq!(args.codebook, None);
            }
            _ => panic!("Expected Encode command"),
        }
    }

    #[test]
    fn test_parse_fit_overrides() {
        let cli = parse_args([
            "cuantizar", "fit", "q.yaml", "-i", "l.json", "--steps", "20", "--lr", "0.05", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Fit(args) => {
                assert_eq!(args.steps, Some(20));
                assert!((args.lr.unwrap() - 0.05).abs() < 1e-6);
                assert_eq!(args.save, None);
            }
            _ => panic!("Expected Fit command"),
        }
    }

    #[test]
    fn test_encode_requires_input() {
        assert!(parse_args(["cuantizar", "encode", "q.yaml"]).is_err());
    }
}
