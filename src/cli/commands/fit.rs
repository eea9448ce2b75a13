//! Fit command implementation

use super::encode::{context_for, load_quantizer};
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{build_optimizer, FitArgs, QuantizerConfig};
use crate::io::{load_latents, save_codebook};
use crate::train::CodebookFitter;

pub fn run_fit(args: FitArgs, level: LogLevel) -> Result<(), String> {
    let mut config =
        QuantizerConfig::load(&args.config).map_err(|e| format!("Config error: {e}"))?;
    if let Some(steps) = args.steps {
        config.fit.steps = steps;
    }
    if let Some(lr) = args.lr {
        config.fit.lr = lr;
    }

    let latents = load_latents(&args.input).map_err(|e| format!("Input error: {e}"))?;
    let (z, shape) = latents.to_tensor(false).map_err(|e| format!("Input error: {e}"))?;

    let mut ctx = context_for(&config, args.seed);
    let mut quantizer = load_quantizer(&config, args.codebook.as_deref(), &mut ctx)?;
    let optimizer = build_optimizer(&config.fit).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, &format!("Fitting {}", quantizer.summary()));
    log(
        level,
        LogLevel::Normal,
        &format!("  {} latents, {} steps, lr={}", shape.rows(), config.fit.steps, config.fit.lr),
    );

    let log_every = config.fit.log_every;
    let mut fitter = CodebookFitter::new(optimizer, config.fit.steps);
    let result = fitter
        .fit(quantizer.as_mut(), &z, shape, &mut ctx, |step, loss| {
            if log_every > 0 && step % log_every == 0 {
                log(level, LogLevel::Verbose, &format!("  step {step:>5}: loss={loss:.6}"));
            }
        })
        .map_err(|e| format!("Fit error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "✓ Loss {:.6} -> {:.6} (best {:.6}) in {:.2}s",
            result.initial_loss, result.final_loss, result.best_loss, result.elapsed_secs
        ),
    );
    log(
        level,
        LogLevel::Normal,
        &format!(
            "  Active codes: {}/{}, perplexity {:.2}",
            result.usage.active,
            quantizer.codebook().n_embed(),
            result.usage.perplexity
        ),
    );

    if let Some(path) = &args.save {
        save_codebook(quantizer.codebook(), path).map_err(|e| format!("Save error: {e}"))?;
        log(level, LogLevel::Normal, &format!("✓ Saved codebook to {}", path.display()));
    }

    Ok(())
}
