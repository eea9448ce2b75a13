//! Nearest-neighbour vector quantizer with commitment loss
//!
//! Each latent row is replaced by its closest codebook entry (after optional
//! L2 normalization of both sides). The loss combines a commitment term that
//! pulls the encoder output towards the selected code and a `beta`-weighted
//! codebook term that pulls the code towards the encoder output:
//!
//! ```text
//! loss = mean((sg[z_q] - z)²) + beta * mean((z_q - sg[z])²)
//! ```
//!
//! Gradients reach the encoder through the straight-through estimator.

use super::base::{argmin_rows, normalize_rows, LatentShape, QuantizeStep, Quantizer, QuantizerSettings};
use super::codebook::Codebook;
use crate::autograd::{add, embedding, mse, scale, squared_distances, Context, Tensor};
use crate::error::Result;

/// Default weight of the codebook term
pub const DEFAULT_BETA: f32 = 0.25;

pub struct VectorQuantizer {
    codebook: Codebook,
    beta: f32,
    settings: QuantizerSettings,
}

impl VectorQuantizer {
    /// Quantizer with a freshly initialized codebook and default settings
    pub fn new(embed_dim: usize, n_embed: usize, ctx: &mut Context) -> Result<Self> {
        Ok(Self::from_codebook(Codebook::uniform(n_embed, embed_dim, ctx.rng())?))
    }

    /// Wrap an existing codebook with default settings
    pub fn from_codebook(codebook: Codebook) -> Self {
        Self {
            codebook,
            beta: DEFAULT_BETA,
            settings: QuantizerSettings {
                use_norm: true,
                straight_through: true,
                residual_depth: None,
            },
        }
    }

    pub fn with_beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_norm(mut self, use_norm: bool) -> Self {
        self.settings.use_norm = use_norm;
        self
    }

    /// Enable residual quantization with `depth` stages
    pub fn with_residual(mut self, depth: usize) -> Self {
        self.settings.residual_depth = Some(depth);
        self
    }

    pub fn beta(&self) -> f32 {
        self.beta
    }
}

impl Quantizer for VectorQuantizer {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn settings(&self) -> &QuantizerSettings {
        &self.settings
    }

    fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    fn codebook_mut(&mut self) -> &mut Codebook {
        &mut self.codebook
    }

    fn quantize(&self, z: &Tensor, shape: LatentShape, _ctx: &mut Context) -> Result<QuantizeStep> {
        shape.validate(z.len(), self.codebook.embed_dim())?;
        let rows = shape.rows();
        let dim = self.codebook.embed_dim();
        let n_embed = self.codebook.n_embed();
        let use_norm = self.settings.use_norm;

        let z_norm = normalize_rows(z, rows, dim, use_norm);
        let codes_norm = self.codebook.normalized(use_norm);

        // Selection is not differentiated
        let distances =
            squared_distances(&z_norm.detach(), &codes_norm.detach(), rows, n_embed, dim);
        let indices = argmin_rows(
            distances.data().as_slice().expect("distance matrix is contiguous"),
            rows,
            n_embed,
        );

        let z_q = embedding(self.codebook.weight(), &indices, dim);
        let z_q_norm = normalize_rows(&z_q, rows, dim, use_norm);

        let commitment = mse(&z_q_norm.detach(), &z_norm);
        let codebook_term = mse(&z_q_norm, &z_norm.detach());
        let loss = add(&commitment, &scale(&codebook_term, self.beta));

        Ok(QuantizeStep { quantized: z_q_norm, loss, indices })
    }
}
