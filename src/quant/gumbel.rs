//! Gumbel-softmax quantizer
//!
//! Code selection is relaxed into a temperature-controlled softmax over
//! negative distances perturbed with Gumbel noise, so gradients reach both
//! the latents and the codebook without a straight-through bypass. In
//! evaluation mode the selection is hardened to a one-hot vector whose
//! gradient is still taken from the soft sample.
//!
//! The loss is a KL divergence from the code posterior to a uniform prior.

use super::base::{argmax_rows, normalize_rows, LatentShape, QuantizeStep, Quantizer, QuantizerSettings};
use super::codebook::Codebook;
use crate::autograd::{
    add, add_scalar, ln, matmul, mul, scale, softmax_rows, squared_distances, sub, sum, Context,
    Tensor,
};
use crate::error::{Result, ValidationError};
use crate::trace::{TraceStep, TRACER};
use ndarray::Array1;
use rand::Rng;

pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_KL_WEIGHT: f32 = 5e-4;

const KL_EPS: f32 = 1e-10;

pub struct GumbelQuantizer {
    codebook: Codebook,
    temperature: f32,
    kl_weight: f32,
    settings: QuantizerSettings,
}

impl GumbelQuantizer {
    pub fn new(embed_dim: usize, n_embed: usize, ctx: &mut Context) -> Result<Self> {
        Ok(Self::from_codebook(Codebook::uniform(n_embed, embed_dim, ctx.rng())?))
    }

    pub fn from_codebook(codebook: Codebook) -> Self {
        Self {
            codebook,
            temperature: DEFAULT_TEMPERATURE,
            kl_weight: DEFAULT_KL_WEIGHT,
            settings: QuantizerSettings {
                use_norm: true,
                straight_through: false,
                residual_depth: None,
            },
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Result<Self> {
        self.set_temperature(temperature)?;
        Ok(self)
    }

    pub fn with_kl_weight(mut self, kl_weight: f32) -> Self {
        self.kl_weight = kl_weight;
        self
    }

    pub fn with_norm(mut self, use_norm: bool) -> Self {
        self.settings.use_norm = use_norm;
        self
    }

    pub fn with_residual(mut self, depth: usize) -> Self {
        self.settings.residual_depth = Some(depth);
        self
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Change the default temperature, e.g. for annealing
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        check_temperature(temperature)?;
        self.temperature = temperature;
        Ok(())
    }

    pub fn kl_weight(&self) -> f32 {
        self.kl_weight
    }

    /// One quantization stage with an explicit temperature override
    pub fn quantize_with_temperature(
        &self,
        z: &Tensor,
        shape: LatentShape,
        ctx: &mut Context,
        temperature: Option<f32>,
    ) -> Result<QuantizeStep> {
        shape.validate(z.len(), self.codebook.embed_dim())?;
        let temperature = temperature.unwrap_or(self.temperature);
        check_temperature(temperature)?;

        // Selection must be discrete outside training
        let hard = !ctx.is_training();
        let rows = shape.rows();
        let dim = self.codebook.embed_dim();
        let n_embed = self.codebook.n_embed();

        let z_norm = normalize_rows(z, rows, dim, self.settings.use_norm);
        let codes_norm = self.codebook.normalized(self.settings.use_norm);
        let logits = scale(&squared_distances(&z_norm, &codes_norm, rows, n_embed, dim), -1.0);

        let noise = TRACER.span(TraceStep::Gumbel, format!("{rows}x{n_embed}"), || {
            sample_gumbel(ctx.rng(), rows * n_embed)
        });
        let perturbed = scale(&add(&logits, &Tensor::constant(noise)), 1.0 / temperature);
        let soft = softmax_rows(&perturbed, rows, n_embed);
        let indices = argmax_rows(
            soft.data().as_slice().expect("softmax output is contiguous"),
            rows,
            n_embed,
        );

        let one_hot = if hard {
            // one_hot - sg[soft] + soft: hard values, soft gradients
            let hard_codes = Tensor::constant(one_hot_rows(&indices, n_embed));
            add(&sub(&hard_codes, &soft.detach()), &soft)
        } else {
            soft
        };

        let quantized = matmul(&one_hot, &codes_norm, rows, n_embed, dim);
        let loss = self.kl_to_uniform(&logits, rows, n_embed);

        Ok(QuantizeStep { quantized, loss, indices })
    }

    /// kl_weight * mean_rows Σ_k q_k ln(q_k · K + eps)
    fn kl_to_uniform(&self, logits: &Tensor, rows: usize, n_embed: usize) -> Tensor {
        TRACER.span(TraceStep::Loss, format!("kl {rows}x{n_embed}"), || {
            let posterior = softmax_rows(logits, rows, n_embed);
            let log_ratio = ln(&add_scalar(&scale(&posterior, n_embed as f32), KL_EPS));
            let kl = sum(&mul(&posterior, &log_ratio));
            scale(&kl, self.kl_weight / rows as f32)
        })
    }
}

impl Quantizer for GumbelQuantizer {
    fn name(&self) -> &'static str {
        "gumbel"
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

    fn quantize(&self, z: &Tensor, shape: LatentShape, ctx: &mut Context) -> Result<QuantizeStep> {
        self.quantize_with_temperature(z, shape, ctx, None)
    }
}

fn check_temperature(temperature: f32) -> Result<()> {
    if !(temperature.is_finite() && temperature > 0.0) {
        return Err(ValidationError::InvalidTemperature(temperature).into());
    }
    Ok(())
}

/// Standard Gumbel samples: -ln(-ln(U)), U ~ U(0, 1)
pub(crate) fn sample_gumbel<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Array1<f32> {
    (0..len)
        .map(|_| {
            let u: f32 = rng.random::<f32>().clamp(f32::MIN_POSITIVE, 1.0 - f32::EPSILON);
            -(-u.ln()).ln()
        })
        .collect()
}

fn one_hot_rows(indices: &[usize], cols: usize) -> Array1<f32> {
    let mut data = Array1::zeros(indices.len() * cols);
    for (row, &index) in indices.iter().enumerate() {
        data[row * cols + index] = 1.0;
    }
    data
}
