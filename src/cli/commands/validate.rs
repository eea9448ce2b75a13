//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{QuantizerConfig, QuantizerSpec, ValidateArgs};

/// Format quantizer parameters as indented lines
pub fn format_quantizer_info(spec: &QuantizerSpec) -> String {
    let mut lines = vec![
        format!("  Type: {}", spec.kind()),
        format!("  Codebook: {} x {}", spec.n_embed(), spec.embed_dim()),
    ];
    match spec {
        QuantizerSpec::Vector(v) => {
            lines.push(format!("  Beta: {}", v.beta));
            lines.push(format!("  Normalize: {}", v.use_norm));
        }
        QuantizerSpec::Gumbel(g) => {
            lines.push(format!("  Temperature: {}", g.temp_init));
            lines.push(format!("  KL weight: {}", g.kl_weight));
            lines.push(format!("  Normalize: {}", g.use_norm));
        }
    }
    if let Some(depth) = spec.residual_depth() {
        lines.push(format!("  Residual stages: {depth}"));
    }
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating {}", args.config.display()));

    let config = QuantizerConfig::load(&args.config).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, "✓ Configuration is valid");
    log(level, LogLevel::Verbose, &format_quantizer_info(&config.quantizer));

    Ok(())
}
