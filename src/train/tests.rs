//! Codebook fitting tests

use super::*;
use crate::autograd::{Context, Tensor};
use crate::optim::{Optimizer, SGD};
use crate::quant::{Codebook, GumbelQuantizer, LatentShape, Quantizer, VectorQuantizer};

/// Four tight clusters around the axes
fn clustered_latents() -> (Tensor, LatentShape) {
    let centers = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];
    let mut data = Vec::new();
    for (i, &(x, y)) in centers.iter().cycle().take(16).enumerate() {
        let jitter = (i as f32 * 0.61).sin() * 0.05;
        data.push(x + jitter);
        data.push(y - jitter);
    }
    (Tensor::from_vec(data, false), LatentShape::new(4, 4, 2))
}

#[test]
fn test_fit_reduces_vector_loss() {
    let (latents, shape) = clustered_latents();
    let mut ctx = Context::with_seed(42);
    let mut quantizer = VectorQuantizer::new(2, 8, &mut ctx).unwrap().with_norm(false);

    let mut fitter = CodebookFitter::new(SGD::new(0.5, 0.0), 60);
    let result = fitter.fit(&mut quantizer, &latents, shape, &mut ctx, |_, _| {}).unwrap();

    assert_eq!(result.steps, 60);
    assert!(result.final_loss < result.initial_loss);
    assert!(result.best_loss <= result.final_loss);
    assert!(result.improvement() > 0.0);
    assert!(result.usage.active >= 1);
}

#[test]
fn test_fit_calls_back_every_step() {
    let (latents, shape) = clustered_latents();
    let mut ctx = Context::with_seed(0);
    let mut quantizer = VectorQuantizer::new(2, 4, &mut ctx).unwrap();

    let mut seen = Vec::new();
    let mut fitter = CodebookFitter::new(SGD::new(0.1, 0.0), 5);
    fitter
        .fit(&mut quantizer, &latents, shape, &mut ctx, |step, loss| seen.push((step, loss)))
        .unwrap();

    assert_eq!(seen.iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert!(seen.iter().all(|(_, l)| l.is_finite()));
}

#[test]
fn test_step_moves_codebook() {
    let (latents, shape) = clustered_latents();
    let codebook = Codebook::from_weights(vec![0.5, 0.5, -0.5, -0.5], 2, 2).unwrap();
    let mut quantizer = VectorQuantizer::from_codebook(codebook).with_norm(false);
    let before = quantizer.codebook().weight().data().clone();

    let mut fitter = CodebookFitter::new(SGD::new(0.1, 0.0), 1);
    let (loss, indices) = fitter
        .step(&mut quantizer, &latents, shape, &mut Context::with_seed(0))
        .unwrap();

    assert!(loss > 0.0);
    assert_eq!(indices.shape(), &[4, 4]);
    assert_ne!(quantizer.codebook().weight().data(), &before);
}

#[test]
fn test_zero_steps_reports_current_usage() {
    let (latents, shape) = clustered_latents();
    let mut ctx = Context::with_seed(3);
    let mut quantizer = VectorQuantizer::new(2, 4, &mut ctx).unwrap();

    let mut fitter = CodebookFitter::new(SGD::new(0.1, 0.0), 0);
    let result = fitter.fit(&mut quantizer, &latents, shape, &mut ctx, |_, _| {}).unwrap();

    assert_eq!(result.steps, 0);
    assert!(result.initial_loss.is_nan());
    assert_eq!(result.usage.counts.iter().sum::<usize>(), 16);
}

#[test]
fn test_fit_gumbel_with_momentum() {
    let (latents, shape) = clustered_latents();
    let mut ctx = Context::with_seed(11);
    let mut quantizer = GumbelQuantizer::new(2, 4, &mut ctx).unwrap().with_kl_weight(1.0);

    let mut fitter = CodebookFitter::new(SGD::new(0.1, 0.9), 20);
    let result = fitter.fit(&mut quantizer, &latents, shape, &mut ctx, |_, _| {}).unwrap();

    assert!(result.final_loss.is_finite());
    assert!((fitter.optimizer().lr() - 0.1).abs() < 1e-6);
}

#[test]
fn test_fit_rejects_mismatched_latents() {
    let mut ctx = Context::with_seed(0);
    let mut quantizer = VectorQuantizer::new(3, 4, &mut ctx).unwrap();
    let latents = Tensor::from_vec(vec![0.0; 8], false);

    let mut fitter = CodebookFitter::new(SGD::new(0.1, 0.0), 3);
    let result = fitter.fit(&mut quantizer, &latents, LatentShape::new(1, 4, 2), &mut ctx, |_, _| {});
    assert!(result.is_err());
}
