//! Quantizer trait, residual driver and straight-through estimator

use super::codebook::Codebook;
use crate::autograd::{add, embedding, l2_normalize_rows, scale, sub, Context, Tensor, NORM_EPS};
use crate::error::{QuantError, Result, ValidationError};
use crate::trace::{TraceStep, TRACER};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// Layout of a latent batch: `(batch, tokens, embed_dim)`, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentShape {
    pub batch: usize,
    pub tokens: usize,
    pub embed_dim: usize,
}

impl LatentShape {
    pub fn new(batch: usize, tokens: usize, embed_dim: usize) -> Self {
        Self { batch, tokens, embed_dim }
    }

    /// Number of latent vectors
    pub fn rows(&self) -> usize {
        self.batch * self.tokens
    }

    pub fn numel(&self) -> usize {
        self.rows() * self.embed_dim
    }

    /// Check a flat buffer of `len` values against this shape and a codebook width
    pub fn validate(&self, len: usize, codebook_dim: usize) -> Result<()> {
        if self.embed_dim == 0 {
            return Err(ValidationError::InvalidEmbedDim(0).into());
        }
        if self.embed_dim != codebook_dim {
            return Err(QuantError::EmbedDimMismatch {
                expected: codebook_dim,
                actual: self.embed_dim,
            });
        }
        if self.rows() == 0 {
            return Err(QuantError::EmptyLatents);
        }
        if len != self.numel() {
            return Err(QuantError::ShapeMismatch {
                len,
                batch: self.batch,
                tokens: self.tokens,
                embed_dim: self.embed_dim,
            });
        }
        Ok(())
    }
}

/// Behavior switches shared by every quantizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizerSettings {
    /// L2-normalize latents and codes before matching
    pub use_norm: bool,
    /// Output `z + detach(z_q - z)` instead of `z_q`
    pub straight_through: bool,
    /// Number of residual stages; `None` quantizes once
    pub residual_depth: Option<usize>,
}

impl QuantizerSettings {
    /// Stages per forward pass
    pub fn depth(&self) -> usize {
        self.residual_depth.unwrap_or(1)
    }
}

/// Result of quantizing once against the codebook
pub struct QuantizeStep {
    /// Quantized latents, same layout as the input
    pub quantized: Tensor,
    /// Scalar loss term
    pub loss: Tensor,
    /// Selected code per latent row
    pub indices: Vec<usize>,
}

/// Result of a full forward pass
pub struct QuantizerOutput {
    /// Quantized latents for the decoder
    pub quantized: Tensor,
    /// Scalar loss (mean over residual stages)
    pub loss: Tensor,
    /// Code indices: `(batch, tokens)`, or `(batch, tokens, depth)` in residual mode
    pub indices: ArrayD<usize>,
}

impl QuantizerOutput {
    pub fn loss_value(&self) -> f32 {
        self.loss.data()[0]
    }
}

/// A codebook quantizer
///
/// Implementors provide a single matching stage in [`Quantizer::quantize`];
/// [`Quantizer::forward`] adds residual stacking and the straight-through
/// estimator on top.
pub trait Quantizer {
    /// Short identifier used in logs and summaries
    fn name(&self) -> &'static str;

    fn settings(&self) -> &QuantizerSettings;

    fn codebook(&self) -> &Codebook;

    fn codebook_mut(&mut self) -> &mut Codebook;

    /// Quantize one stage
    fn quantize(&self, z: &Tensor, shape: LatentShape, ctx: &mut Context) -> Result<QuantizeStep>;

    /// Quantize latents, returning the decoder input, loss and code indices
    fn forward(
        &self,
        z: &Tensor,
        shape: LatentShape,
        ctx: &mut Context,
    ) -> Result<QuantizerOutput> {
        shape.validate(z.len(), self.codebook().embed_dim())?;
        TRACER.start(TraceStep::Forward);
        let output = run_forward(self, z, shape, ctx);
        TRACER.end(TraceStep::Forward, format!("{} {}x{}", self.name(), shape.rows(), shape.embed_dim));
        output
    }

    /// Map code indices back to (normalized) codebook vectors
    ///
    /// Residual indices are summed over their trailing depth axis.
    fn decode_indices(&self, indices: &ArrayD<usize>) -> Result<Tensor> {
        let settings = self.settings();
        let codebook = self.codebook();
        let (rows, depth) = match indices.shape() {
            [b, t] => (b * t, 1),
            [b, t, d] => {
                if *d != settings.depth() {
                    return Err(QuantError::DepthMismatch {
                        expected: settings.depth(),
                        actual: *d,
                    });
                }
                (b * t, *d)
            }
            other => return Err(QuantError::IndexRank(other.len())),
        };
        for &index in indices.iter() {
            codebook.check_index(index)?;
        }

        let table = codebook.normalized(settings.use_norm);
        let flat: Vec<usize> = indices.iter().copied().collect();
        let dim = codebook.embed_dim();
        let mut decoded = Tensor::zeros(rows * dim, false);
        for stage in 0..depth {
            let stage_indices: Vec<usize> = flat.iter().skip(stage).step_by(depth).copied().collect();
            decoded = add(&decoded, &embedding(&table, &stage_indices, dim));
        }
        Ok(decoded)
    }

    /// Trainable tensors, for an optimizer
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![self.codebook_mut().weight_mut()]
    }

    fn summary(&self) -> String {
        let settings = self.settings();
        let codebook = self.codebook();
        format!(
            "{} quantizer: {} codes x {} dims, norm={}, straight_through={}, depth={}",
            self.name(),
            codebook.n_embed(),
            codebook.embed_dim(),
            settings.use_norm,
            settings.straight_through,
            settings.depth()
        )
    }
}

fn run_forward<Q: Quantizer + ?Sized>(
    quantizer: &Q,
    z: &Tensor,
    shape: LatentShape,
    ctx: &mut Context,
) -> Result<QuantizerOutput> {
    let settings = *quantizer.settings();

    let (z_q, loss, indices) = match settings.residual_depth {
        None => {
            let step = quantizer.quantize(z, shape, ctx)?;
            let indices = ArrayD::from_shape_vec(IxDyn(&[shape.batch, shape.tokens]), step.indices)?;
            (step.quantized, step.loss, indices)
        }
        Some(0) => return Err(ValidationError::MissingResidualDepth.into()),
        Some(depth) => {
            let mut z_q = Tensor::zeros(z.len(), false);
            let mut residual = z.detach();
            let mut losses = Vec::with_capacity(depth);
            let mut stage_indices = Vec::with_capacity(depth);

            for stage in 0..depth {
                let step = quantizer.quantize(&residual, shape, ctx)?;
                residual = sub(&residual, &step.quantized);
                z_q = add(&z_q, &step.quantized);
                tracing::debug!(
                    quantizer = quantizer.name(),
                    stage,
                    loss = step.loss.data()[0],
                    "residual stage"
                );
                losses.push(step.loss);
                stage_indices.push(step.indices);
            }

            let total = losses[1..].iter().fold(losses[0].clone(), |acc, l| add(&acc, l));
            let loss = scale(&total, 1.0 / depth as f32);

            // Stack stages on a trailing axis
            let rows = shape.rows();
            let mut flat = Vec::with_capacity(rows * depth);
            for row in 0..rows {
                flat.extend(stage_indices.iter().map(|s| s[row]));
            }
            let indices = ArrayD::from_shape_vec(IxDyn(&[shape.batch, shape.tokens, depth]), flat)?;
            (z_q, loss, indices)
        }
    };

    let quantized = if settings.straight_through {
        // Forward value is z_q; gradient w.r.t. z is the identity
        add(z, &sub(&z_q, z).detach())
    } else {
        z_q
    };

    Ok(QuantizerOutput { quantized, loss, indices })
}

/// Row-wise L2 normalization, or the identity when `use_norm` is off
pub(crate) fn normalize_rows(x: &Tensor, rows: usize, dim: usize, use_norm: bool) -> Tensor {
    if use_norm {
        l2_normalize_rows(x, rows, dim, NORM_EPS)
    } else {
        x.clone()
    }
}

/// Index of the smallest value in each row; the first minimum wins ties
pub(crate) fn argmin_rows(values: &[f32], rows: usize, cols: usize) -> Vec<usize> {
    select_rows(values, rows, cols, |candidate, best| candidate < best)
}

/// Index of the largest value in each row; the first maximum wins ties
pub(crate) fn argmax_rows(values: &[f32], rows: usize, cols: usize) -> Vec<usize> {
    select_rows(values, rows, cols, |candidate, best| candidate > best)
}

fn select_rows(values: &[f32], rows: usize, cols: usize, better: impl Fn(f32, f32) -> bool) -> Vec<usize> {
    (0..rows)
        .map(|r| {
            let row = &values[r * cols..(r + 1) * cols];
            let mut best = 0;
            for (j, &v) in row.iter().enumerate().skip(1) {
                if better(v, row[best]) || row[best].is_nan() {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Histogram of code assignments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeUsage {
    /// Assignments per code
    pub counts: Vec<usize>,
    /// Number of codes assigned at least once
    pub active: usize,
    /// exp(entropy) of the assignment distribution
    pub perplexity: f32,
}

/// Count how often each of `n_embed` codes appears in `indices`
pub fn code_usage(indices: &ArrayD<usize>, n_embed: usize) -> Result<CodeUsage> {
    let mut counts = vec![0usize; n_embed];
    for &index in indices.iter() {
        let slot = counts
            .get_mut(index)
            .ok_or(QuantError::IndexOutOfRange { index, n_embed })?;
        *slot += 1;
    }

    let total = indices.len() as f32;
    let entropy: f32 = if total > 0.0 {
        counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f32 / total;
                -p * p.ln()
            })
            .sum()
    } else {
        0.0
    };

    Ok(CodeUsage {
        active: counts.iter().filter(|&&c| c > 0).count(),
        counts,
        perplexity: entropy.exp(),
    })
}
