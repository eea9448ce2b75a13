//! Codebook quantization for vector-quantized autoencoders
//!
//! Maps continuous encoder latents onto entries of a learned codebook:
//! - Vector quantization: nearest code, commitment loss, straight-through
//!   gradients
//! - Gumbel quantization: temperature-controlled relaxed selection with a KL
//!   prior loss
//! - Residual quantization: either quantizer applied repeatedly to what the
//!   previous stages left unexplained

mod base;
mod codebook;
mod gumbel;
mod vector;


pub use base::{
    code_usage, CodeUsage, LatentShape, QuantizeStep, Quantizer, QuantizerOutput,
    QuantizerSettings,
};
pub use codebook::{Codebook, CodebookSnapshot};
pub use gumbel::{GumbelQuantizer, DEFAULT_KL_WEIGHT, DEFAULT_TEMPERATURE};
pub use vector::{VectorQuantizer, DEFAULT_BETA};
