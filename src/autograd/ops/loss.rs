//! Loss helpers composed from differentiable primitives

use super::basic::{mean, mul, sub};
use crate::autograd::Tensor;
use crate::trace::{TraceStep, TRACER};

/// Mean squared error: mean((a - b)²)
pub fn mse(a: &Tensor, b: &Tensor) -> Tensor {
    TRACER.span(TraceStep::Loss, format!("mse {}", a.len()), || {
        let diff = sub(a, b);
        mean(&mul(&diff, &diff))
    })
}
