//! Tape-based autograd engine
//!
//! Provides automatic differentiation over flat `f32` tensors using a
//! computational graph recorded during the forward pass.
//!
//! ```ignore
//! use cuantizar::autograd::{backward, mul, sum, Tensor};
//!
//! let x = Tensor::from_vec(vec![1.0, 2.0], true);
//! let mut y = sum(&mul(&x, &x));
//! backward(&mut y, None);
//! assert_eq!(x.grad().unwrap()[1], 4.0);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::BackwardOp;
pub use context::Context;
pub use ops::*;
pub use tensor::{GradCell, Tensor};

use crate::trace::{TraceStep, TRACER};

/// Perform backward pass on a tensor
///
/// Seeds the output gradient with `grad_output`, or ones for a scalar loss,
/// then propagates through every reachable op exactly once.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        let ones = ndarray::Array1::ones(tensor.data().len());
        tensor.set_grad(ones);
    }

    TRACER.span(TraceStep::Backward, format!("{} outputs", tensor.len()), || {
        backward::run_backward(tensor);
    });
}
