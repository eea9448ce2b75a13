//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod distance;
mod embedding;
mod loss;
mod matmul;
mod normalize;

// Re-export all public operations
pub use activations::{ln, softmax_rows};
pub use basic::{add, add_scalar, mean, mul, scale, sub, sum};
pub use distance::squared_distances;
pub use embedding::embedding;
pub use loss::mse;
pub use matmul::{matmul, matmul_compute, transpose};
pub use normalize::{l2_normalize_rows, NORM_EPS};
