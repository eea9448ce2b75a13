//! Configuration validation

use super::schema::{FitSpec, QuantizerConfig, QuantizerSpec};
use crate::error::ValidationError;

/// Validate a complete quantizer configuration
pub fn validate_config(config: &QuantizerConfig) -> Result<(), ValidationError> {
    validate_quantizer(&config.quantizer)?;
    validate_fit(&config.fit)
}

/// Validate quantizer parameters
pub fn validate_quantizer(spec: &QuantizerSpec) -> Result<(), ValidationError> {
    if spec.embed_dim() == 0 {
        return Err(ValidationError::InvalidEmbedDim(spec.embed_dim()));
    }
    if spec.n_embed() == 0 {
        return Err(ValidationError::InvalidCodebookSize(spec.n_embed()));
    }

    let (use_residual, num_quantizers) = match spec {
        QuantizerSpec::Vector(v) => {
            if !(v.beta >= 0.0) {
                return Err(ValidationError::InvalidBeta(v.beta));
            }
            (v.use_residual, v.num_quantizers)
        }
        QuantizerSpec::Gumbel(g) => {
            if !(g.kl_weight >= 0.0) {
                return Err(ValidationError::InvalidKlWeight(g.kl_weight));
            }
            if !(g.temp_init.is_finite() && g.temp_init > 0.0) {
                return Err(ValidationError::InvalidTemperature(g.temp_init));
            }
            (g.use_residual, g.num_quantizers)
        }
    };

    if use_residual && num_quantizers.unwrap_or(0) == 0 {
        return Err(ValidationError::MissingResidualDepth);
    }

    Ok(())
}

/// Validate fitting parameters
pub fn validate_fit(fit: &FitSpec) -> Result<(), ValidationError> {
    if !(fit.lr > 0.0 && fit.lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate(fit.lr));
    }
    if !(0.0..1.0).contains(&fit.momentum) {
        return Err(ValidationError::InvalidMomentum(fit.momentum));
    }
    Ok(())
}
