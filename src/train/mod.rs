//! Codebook fitting
//!
//! Runs forward, backward and optimizer steps against a fixed latent set.
//! Useful for initializing a codebook from encoder outputs before joint
//! training, and for checking that gradients actually reach the codebook.
//!
//! ```no_run
//! use cuantizar::autograd::{Context, Tensor};
//! use cuantizar::optim::SGD;
//! use cuantizar::quant::{LatentShape, VectorQuantizer};
//! use cuantizar::train::CodebookFitter;
//!
//! let mut ctx = Context::with_seed(0);
//! let mut quantizer = VectorQuantizer::new(4, 16, &mut ctx)?;
//! let latents = Tensor::from_vec(vec![0.5; 2 * 8 * 4], false);
//! let shape = LatentShape::new(2, 8, 4);
//!
//! let mut fitter = CodebookFitter::new(SGD::new(0.1, 0.0), 50);
//! let result = fitter.fit(&mut quantizer, &latents, shape, &mut ctx, |_, _| {})?;
//! println!("loss {} -> {}", result.initial_loss, result.final_loss);
//! # Ok::<(), cuantizar::QuantError>(())
//! ```

mod fitter;
mod result;

#[cfg(test)]
mod tests;

pub use fitter::CodebookFitter;
pub use result::FitResult;
