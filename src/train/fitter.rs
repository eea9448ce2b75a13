//! Codebook fitting loop

use super::FitResult;
use crate::autograd::{backward, Context, Tensor};
use crate::error::Result;
use crate::optim::Optimizer;
use crate::quant::{code_usage, LatentShape, Quantizer};
use std::time::Instant;

/// Fits a quantizer's codebook to a fixed set of latents by minimizing the
/// quantizer's own loss
pub struct CodebookFitter<O: Optimizer> {
    optimizer: O,
    steps: usize,
}

impl<O: Optimizer> CodebookFitter<O> {
    pub fn new(optimizer: O, steps: usize) -> Self {
        Self { optimizer, steps }
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    /// Perform a single fitting step, returning the loss before the update
    pub fn step(
        &mut self,
        quantizer: &mut dyn Quantizer,
        latents: &Tensor,
        shape: LatentShape,
        ctx: &mut Context,
    ) -> Result<(f32, ndarray::ArrayD<usize>)> {
        self.optimizer.zero_grad(&mut quantizer.parameters_mut());

        let mut output = quantizer.forward(latents, shape, ctx)?;
        let loss_val = output.loss_value();

        backward(&mut output.loss, None);
        self.optimizer.step(&mut quantizer.parameters_mut());

        Ok((loss_val, output.indices))
    }

    /// Run every step, calling `on_step(step, loss)` after each update
    pub fn fit<F>(
        &mut self,
        quantizer: &mut dyn Quantizer,
        latents: &Tensor,
        shape: LatentShape,
        ctx: &mut Context,
        mut on_step: F,
    ) -> Result<FitResult>
    where
        F: FnMut(usize, f32),
    {
        let start = Instant::now();
        // Latents are fixed data here; no encoder to update
        let latents = latents.detach();

        let mut initial_loss = f32::NAN;
        let mut final_loss = f32::NAN;
        let mut best_loss = f32::INFINITY;
        let mut last_indices = None;

        for step in 0..self.steps {
            let (loss, indices) = self.step(quantizer, &latents, shape, ctx)?;
            if step == 0 {
                initial_loss = loss;
            }
            final_loss = loss;
            best_loss = best_loss.min(loss);
            last_indices = Some(indices);

            tracing::trace!(step, loss, "fit step");
            on_step(step, loss);
        }

        let indices = match last_indices {
            Some(indices) => indices,
            None => quantizer.forward(&latents, shape, ctx)?.indices,
        };
        let usage = code_usage(&indices, quantizer.codebook().n_embed())?;

        tracing::debug!(
            steps = self.steps,
            final_loss,
            perplexity = usage.perplexity,
            "codebook fit finished"
        );

        Ok(FitResult {
            steps: self.steps,
            initial_loss,
            final_loss,
            best_loss,
            usage,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}
