//! Error types for quantizer construction and execution

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, QuantError>;

/// Errors raised by quantizers, configuration and data files
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
    #[error("Latent length {len} does not match shape {batch}x{tokens}x{embed_dim}")]
    ShapeMismatch { len: usize, batch: usize, tokens: usize, embed_dim: usize },

    #[error("Latent dimension {actual} does not match codebook dimension {expected}")]
    EmbedDimMismatch { expected: usize, actual: usize },

    #[error("Code index {index} out of range for codebook of {n_embed} entries")]
    IndexOutOfRange { index: usize, n_embed: usize },

    #[error("Index array must have 2 (batch, tokens) or 3 (batch, tokens, depth) axes, got {0}")]
    IndexRank(usize),

    #[error("Residual depth {actual} does not match quantizer depth {expected}")]
    DepthMismatch { expected: usize, actual: usize },

    #[error("Codebook weight length {len} does not match {n_embed}x{embed_dim}")]
    CodebookShape { len: usize, n_embed: usize, embed_dim: usize },

    #[error("Latent batch is empty")]
    EmptyLatents,

    #[error("Invalid index layout: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid embed_dim: {0} (must be > 0)")]
    InvalidEmbedDim(usize),

    #[error("Invalid n_embed: {0} (must be > 0)")]
    InvalidCodebookSize(usize),

    #[error("Invalid beta: {0} (must be >= 0.0)")]
    InvalidBeta(f32),

    #[error("Invalid kl_weight: {0} (must be >= 0.0)")]
    InvalidKlWeight(f32),

    #[error("Invalid temperature: {0} (must be > 0.0)")]
    InvalidTemperature(f32),

    #[error("Residual quantization requires num_quantizers >= 1")]
    MissingResidualDepth,

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid momentum: {0} (must be in [0.0, 1.0))")]
    InvalidMomentum(f32),
}
