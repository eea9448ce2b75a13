//! Cuantizar: codebook quantization for vector-quantized autoencoders
//!
//! Quantizers map continuous encoder latents of shape
//! `(batch, tokens, embed_dim)` onto entries of a learned codebook and
//! return the decoder input, a scalar training loss and the selected code
//! indices.
//!
//! # Architecture
//!
//! - `autograd`: tape-based automatic differentiation over flat tensors
//! - `quant`: vector, Gumbel-softmax and residual quantizers
//! - `optim`: SGD for codebook updates
//! - `train`: codebook fitting loop
//! - `config`: YAML configuration and CLI arguments
//! - `io`: JSON latents, codebooks and encoding records
//! - `trace`: per-step timing of the quantizer pipeline

pub mod autograd;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod optim;
pub mod quant;
pub mod trace;
pub mod train;

pub use autograd::{Context, Tensor};
pub use error::{QuantError, Result, ValidationError};
pub use quant::{GumbelQuantizer, LatentShape, Quantizer, QuantizerOutput, VectorQuantizer};
