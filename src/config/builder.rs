//! Build quantizers and optimizers from configuration

use super::schema::{FitSpec, QuantizerConfig, QuantizerSpec};
use super::validate::{validate_config, validate_fit, validate_quantizer};
use crate::autograd::Context;
use crate::error::{QuantError, Result};
use crate::optim::SGD;
use crate::quant::{Codebook, GumbelQuantizer, Quantizer, VectorQuantizer};
use std::fs;
use std::path::Path;

impl QuantizerConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: QuantizerConfig = serde_yaml::from_str(yaml)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|source| QuantError::Io { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&yaml)
    }

    /// Execution context, reproducible when a seed is configured
    pub fn context(&self) -> Context {
        match self.seed {
            Some(seed) => Context::with_seed(seed),
            None => Context::new(),
        }
    }
}

/// Build a quantizer with a freshly initialized codebook
pub fn build_quantizer(spec: &QuantizerSpec, ctx: &mut Context) -> Result<Box<dyn Quantizer>> {
    validate_quantizer(spec)?;
    let codebook = Codebook::uniform(spec.n_embed(), spec.embed_dim(), ctx.rng())?;
    build_with_codebook(spec, codebook)
}

/// Build a quantizer around an existing codebook
pub fn build_with_codebook(spec: &QuantizerSpec, codebook: Codebook) -> Result<Box<dyn Quantizer>> {
    validate_quantizer(spec)?;
    if codebook.n_embed() != spec.n_embed() || codebook.embed_dim() != spec.embed_dim() {
        return Err(QuantError::CodebookShape {
            len: codebook.weight().len(),
            n_embed: spec.n_embed(),
            embed_dim: spec.embed_dim(),
        });
    }

    let depth = spec.residual_depth();
    let quantizer: Box<dyn Quantizer> = match spec {
        QuantizerSpec::Vector(v) => {
            let mut q = VectorQuantizer::from_codebook(codebook).with_beta(v.beta).with_norm(v.use_norm);
            if let Some(depth) = depth {
                q = q.with_residual(depth);
            }
            Box::new(q)
        }
        QuantizerSpec::Gumbel(g) => {
            let mut q = GumbelQuantizer::from_codebook(codebook)
                .with_temperature(g.temp_init)?
                .with_kl_weight(g.kl_weight)
                .with_norm(g.use_norm);
            if let Some(depth) = depth {
                q = q.with_residual(depth);
            }
            Box::new(q)
        }
    };

    tracing::debug!(summary = %quantizer.summary(), "built quantizer");
    Ok(quantizer)
}

/// Build the codebook optimizer
pub fn build_optimizer(fit: &FitSpec) -> Result<SGD> {
    validate_fit(fit)?;
    Ok(SGD::new(fit.lr, fit.momentum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::VectorSpec;

    const RESIDUAL_YAML: &str = r#"
seed: 11
quantizer:
  type: vector
  embed_dim: 3
  n_embed: 5
  use_residual: true
  num_quantizers: 2
"#;

    #[test]
    fn test_build_from_yaml() {
        let config = QuantizerConfig::from_yaml_str(RESIDUAL_YAML).expect("valid config");
        let mut ctx = config.context();
        let q = build_quantizer(&config.quantizer, &mut ctx).expect("builds");
        assert_eq!(q.name(), "vector");
        assert_eq!(q.settings().residual_depth, Some(2));
        assert!(q.settings().straight_through);
        assert_eq!(q.codebook().n_embed(), 5);
        assert_eq!(q.codebook().embed_dim(), 3);
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let config = QuantizerConfig::from_yaml_str(RESIDUAL_YAML).expect("valid config");
        let a = build_quantizer(&config.quantizer, &mut config.context()).expect("builds");
        let b = build_quantizer(&config.quantizer, &mut config.context()).expect("builds");
        assert_eq!(a.codebook().weight().data(), b.codebook().weight().data());
    }

    #[test]
    fn test_invalid_yaml_config_rejected() {
        let yaml = "quantizer:\n  type: vector\n  embed_dim: 0\n  n_embed: 4\n";
        assert!(matches!(
            QuantizerConfig::from_yaml_str(yaml),
            Err(QuantError::Validation(_))
        ));
    }

    #[test]
    fn test_codebook_shape_mismatch() {
        let spec = QuantizerSpec::Vector(VectorSpec {
            embed_dim: 2,
            n_embed: 3,
            beta: 0.25,
            use_norm: true,
            use_residual: false,
            num_quantizers: None,
        });
        let codebook = Codebook::from_weights(vec![0.0; 8], 4, 2).expect("valid codebook");
        assert!(matches!(
            build_with_codebook(&spec, codebook),
            Err(QuantError::CodebookShape { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = QuantizerConfig::load("/nonexistent/quantizer.yaml").unwrap_err();
        assert!(err.to_string().contains("quantizer.yaml"));
    }
}
