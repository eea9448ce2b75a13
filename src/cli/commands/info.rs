//! Info command implementation

use super::validate::format_quantizer_info;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{InfoArgs, QuantizerConfig};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let config = QuantizerConfig::load(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let spec = &config.quantizer;
    let depth = spec.residual_depth().unwrap_or(1);

    log(level, LogLevel::Normal, "Quantizer Info:");
    log(level, LogLevel::Normal, &format_quantizer_info(spec));
    log(
        level,
        LogLevel::Normal,
        &format!("  Parameters: {}", spec.n_embed() * spec.embed_dim()),
    );
    log(
        level,
        LogLevel::Normal,
        &format!(
            "  Bits per token: {:.2}",
            depth as f64 * (spec.n_embed() as f64).log2()
        ),
    );
    match config.seed {
        Some(seed) => log(level, LogLevel::Normal, &format!("  Seed: {seed}")),
        None => log(level, LogLevel::Normal, "  Seed: random"),
    }
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Fit: {} steps, lr={}, momentum={}",
            config.fit.steps, config.fit.lr, config.fit.momentum
        ),
    );

    Ok(())
}
