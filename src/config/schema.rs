//! YAML schema definitions for declarative quantizer configuration

use serde::{Deserialize, Serialize};

/// Complete quantizer specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizerConfig {
    /// Seed for codebook initialization and Gumbel noise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Quantizer definition
    pub quantizer: QuantizerSpec,

    /// Codebook fitting parameters
    #[serde(default)]
    pub fit: FitSpec,
}

/// Quantizer variant, selected by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuantizerSpec {
    /// Nearest-neighbour lookup with commitment loss
    Vector(VectorSpec),
    /// Gumbel-softmax relaxation with KL prior loss
    Gumbel(GumbelSpec),
}

impl QuantizerSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            QuantizerSpec::Vector(_) => "vector",
            QuantizerSpec::Gumbel(_) => "gumbel",
        }
    }

    pub fn embed_dim(&self) -> usize {
        match self {
            QuantizerSpec::Vector(v) => v.embed_dim,
            QuantizerSpec::Gumbel(g) => g.embed_dim,
        }
    }

    pub fn n_embed(&self) -> usize {
        match self {
            QuantizerSpec::Vector(v) => v.n_embed,
            QuantizerSpec::Gumbel(g) => g.n_embed,
        }
    }

    /// Residual stages, when residual quantization is enabled
    pub fn residual_depth(&self) -> Option<usize> {
        let (use_residual, num_quantizers) = match self {
            QuantizerSpec::Vector(v) => (v.use_residual, v.num_quantizers),
            QuantizerSpec::Gumbel(g) => (g.use_residual, g.num_quantizers),
        };
        if use_residual {
            num_quantizers
        } else {
            None
        }
    }
}

/// Vector quantizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSpec {
    pub embed_dim: usize,
    pub n_embed: usize,

    #[serde(default = "default_beta")]
    pub beta: f32,

    #[serde(default = "default_true")]
    pub use_norm: bool,

    #[serde(default)]
    pub use_residual: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_quantizers: Option<usize>,
}

/// Gumbel quantizer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GumbelSpec {
    pub embed_dim: usize,
    pub n_embed: usize,

    #[serde(default = "default_temperature")]
    pub temp_init: f32,

    #[serde(default = "default_kl_weight")]
    pub kl_weight: f32,

    #[serde(default = "default_true")]
    pub use_norm: bool,

    #[serde(default)]
    pub use_residual: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_quantizers: Option<usize>,
}

/// SGD settings for codebook fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSpec {
    #[serde(default = "default_steps")]
    pub steps: usize,

    #[serde(default = "default_lr")]
    pub lr: f32,

    #[serde(default)]
    pub momentum: f32,

    /// Log every N steps (0 disables)
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

impl Default for FitSpec {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            lr: default_lr(),
            momentum: 0.0,
            log_every: default_log_every(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_beta() -> f32 {
    crate::quant::DEFAULT_BETA
}

fn default_temperature() -> f32 {
    crate::quant::DEFAULT_TEMPERATURE
}

fn default_kl_weight() -> f32 {
    crate::quant::DEFAULT_KL_WEIGHT
}

fn default_steps() -> usize {
    100
}

fn default_lr() -> f32 {
    0.1
}

fn default_log_every() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_defaults() {
        let yaml = r#"
quantizer:
  type: vector
  embed_dim: 8
  n_embed: 16
"#;
        let config: QuantizerConfig = serde_yaml::from_str(yaml).expect("should parse");
        assert_eq!(config.seed, None);
        match &config.quantizer {
            QuantizerSpec::Vector(v) => {
                assert_eq!(v.embed_dim, 8);
                assert_eq!(v.n_embed, 16);
                assert!((v.beta - 0.25).abs() < 1e-6);
                assert!(v.use_norm);
                assert!(!v.use_residual);
                assert_eq!(v.num_quantizers, None);
            }
            other => panic!("Expected vector spec, got {other:?}"),
        }
        assert_eq!(config.fit, FitSpec::default());
    }

    #[test]
    fn test_gumbel_defaults() {
        let yaml = r#"
seed: 3
quantizer:
  type: gumbel
  embed_dim: 4
  n_embed: 32
  use_residual: true
  num_quantizers: 2
"#;
        let config: QuantizerConfig = serde_yaml::from_str(yaml).expect("should parse");
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.quantizer.kind(), "gumbel");
        assert_eq!(config.quantizer.residual_depth(), Some(2));
        match &config.quantizer {
            QuantizerSpec::Gumbel(g) => {
                assert!((g.temp_init - 1.0).abs() < 1e-6);
                assert!((g.kl_weight - 5e-4).abs() < 1e-9);
            }
            other => panic!("Expected gumbel spec, got {other:?}"),
        }
    }

    #[test]
    fn test_residual_depth_ignored_when_disabled() {
        let spec = QuantizerSpec::Vector(VectorSpec {
            embed_dim: 4,
            n_embed: 4,
            beta: 0.25,
            use_norm: true,
            use_residual: false,
            num_quantizers: Some(3),
        });
        assert_eq!(spec.residual_depth(), None);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let yaml = "quantizer:\n  type: lookup_free\n  embed_dim: 4\n  n_embed: 4\n";
        assert!(serde_yaml::from_str::<QuantizerConfig>(yaml).is_err());
    }

    #[test]
    fn test_fit_section() {
        let yaml = r#"
quantizer:
  type: vector
  embed_dim: 2
  n_embed: 2
fit:
  steps: 5
  lr: 0.5
"#;
        let config: QuantizerConfig = serde_yaml::from_str(yaml).expect("should parse");
        assert_eq!(config.fit.steps, 5);
        assert!((config.fit.lr - 0.5).abs() < 1e-6);
        assert_eq!(config.fit.log_every, 10);
    }
}
