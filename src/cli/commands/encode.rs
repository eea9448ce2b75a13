//! Encode command implementation

use crate::autograd::Context;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{build_quantizer, build_with_codebook, EncodeArgs, QuantizerConfig};
use crate::io::{load_codebook, load_latents, save_json, EncodingRecord};
use crate::quant::{code_usage, Quantizer};
use crate::trace::TRACER;

/// Seed override from the command line wins over the configured seed
pub(super) fn context_for(config: &QuantizerConfig, seed: Option<u64>) -> Context {
    match seed {
        Some(seed) => Context::with_seed(seed),
        None => config.context(),
    }
}

/// Build the quantizer, from a saved codebook when one is given
pub(super) fn load_quantizer(
    config: &QuantizerConfig,
    codebook: Option<&std::path::Path>,
    ctx: &mut Context,
) -> Result<Box<dyn Quantizer>, String> {
    match codebook {
        Some(path) => {
            let codebook = load_codebook(path).map_err(|e| format!("Codebook error: {e}"))?;
            build_with_codebook(&config.quantizer, codebook)
        }
        None => build_quantizer(&config.quantizer, ctx),
    }
    .map_err(|e| format!("Quantizer error: {e}"))
}

pub fn run_encode(args: EncodeArgs, level: LogLevel) -> Result<(), String> {
    let config = QuantizerConfig::load(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let latents = load_latents(&args.input).map_err(|e| format!("Input error: {e}"))?;
    let (z, shape) = latents.to_tensor(false).map_err(|e| format!("Input error: {e}"))?;

    let mut ctx = context_for(&config, args.seed);
    let quantizer = load_quantizer(&config, args.codebook.as_deref(), &mut ctx)?;
    if !args.train {
        ctx.eval();
    }

    log(level, LogLevel::Verbose, &quantizer.summary());

    if args.trace {
        TRACER.clear();
        TRACER.enable();
    }
    let output = quantizer.forward(&z, shape, &mut ctx).map_err(|e| format!("Encode error: {e}"))?;
    if args.trace {
        TRACER.disable();
        log(level, LogLevel::Normal, &TRACER.report());
    }

    let usage = code_usage(&output.indices, quantizer.codebook().n_embed())
        .map_err(|e| format!("Encode error: {e}"))?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Encoded {} latents: loss={:.6}, active codes={}, perplexity={:.2}",
            shape.rows(),
            output.loss_value(),
            usage.active,
            usage.perplexity
        ),
    );

    let record = EncodingRecord::from_output(quantizer.name(), &output);
    match &args.output {
        Some(path) => {
            save_json(&record, path).map_err(|e| format!("Output error: {e}"))?;
            log(level, LogLevel::Normal, &format!("✓ Wrote {}", path.display()));
        }
        None => {
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
    }

    Ok(())
}
