//! On-disk record types

use crate::autograd::Tensor;
use crate::error::{QuantError, Result};
use crate::quant::{LatentShape, QuantizerOutput};
use serde::{Deserialize, Serialize};

/// Latent batch: `shape = [batch, tokens, embed_dim]`, row-major `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentFile {
    pub shape: [usize; 3],
    pub data: Vec<f32>,
}

impl LatentFile {
    pub fn new(shape: LatentShape, data: Vec<f32>) -> Self {
        Self {
            shape: [shape.batch, shape.tokens, shape.embed_dim],
            data,
        }
    }

    pub fn latent_shape(&self) -> LatentShape {
        LatentShape::new(self.shape[0], self.shape[1], self.shape[2])
    }

    /// Latents as a graph input, after checking the declared shape
    pub fn to_tensor(&self, requires_grad: bool) -> Result<(Tensor, LatentShape)> {
        let shape = self.latent_shape();
        if self.data.len() != shape.numel() {
            return Err(QuantError::ShapeMismatch {
                len: self.data.len(),
                batch: shape.batch,
                tokens: shape.tokens,
                embed_dim: shape.embed_dim,
            });
        }
        Ok((Tensor::from_vec(self.data.clone(), requires_grad), shape))
    }
}

/// Output of the `encode` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingRecord {
    pub quantizer: String,
    /// `[batch, tokens]` or `[batch, tokens, depth]`
    pub index_shape: Vec<usize>,
    pub indices: Vec<usize>,
    pub loss: f32,
    pub quantized: Vec<f32>,
}

impl EncodingRecord {
    pub fn from_output(quantizer: &str, output: &QuantizerOutput) -> Self {
        Self {
            quantizer: quantizer.to_string(),
            index_shape: output.indices.shape().to_vec(),
            indices: output.indices.iter().copied().collect(),
            loss: output.loss_value(),
            quantized: output.quantized.data().to_vec(),
        }
    }
}
