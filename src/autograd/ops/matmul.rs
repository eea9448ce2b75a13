//! Matrix multiplication autograd operations
//!
//! Row-major flat buffers are viewed as 2-D ndarray matrices and multiplied
//! with ndarray's GEMM. Instrumented with TRACER.

use crate::autograd::{BackwardOp, GradCell, Tensor};
use crate::trace::{TraceStep, TRACER};
use ndarray::{Array1, ArrayView2};
use std::rc::Rc;

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
pub fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let view = ArrayView2::from_shape((rows, cols), data).expect("transpose: shape mismatch");
    view.t().iter().copied().collect()
}

/// Compute C = A @ B on raw row-major buffers
pub fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    TRACER.span(TraceStep::Matmul, format!("{m}x{k}x{n}"), || {
        let a = ArrayView2::from_shape((m, k), a).expect("matrix A shape mismatch");
        let b = ArrayView2::from_shape((k, n), b).expect("matrix B shape mismatch");
        a.dot(&b).iter().copied().collect()
    })
}

/// Matrix multiplication
///
/// Computes C = A @ B where:
/// - A is m×k (flattened to length m*k)
/// - B is k×n (flattened to length k*n)
/// - C is m×n (flattened to length m*n)
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let result_data = matmul_compute(
        a.data().as_slice().expect("matrix A must be contiguous"),
        b.data().as_slice().expect("matrix B must be contiguous"),
        m,
        k,
        n,
    );

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(result_data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad = grad.as_slice().expect("gradient must be contiguous");

            if self.a.requires_grad() {
                // ∂L/∂A = ∂L/∂C @ B^T   (m×n @ n×k)
                let b_t = transpose(
                    self.b.data().as_slice().expect("matrix B must be contiguous"),
                    self.k,
                    self.n,
                );
                let grad_a = matmul_compute(grad, &b_t, self.m, self.n, self.k);
                self.a.accumulate_grad(Array1::from(grad_a));
            }

            if self.b.requires_grad() {
                // ∂L/∂B = A^T @ ∂L/∂C   (k×m @ m×n)
                let a_t = transpose(
                    self.a.data().as_slice().expect("matrix A must be contiguous"),
                    self.m,
                    self.k,
                );
                let grad_b = matmul_compute(&a_t, grad, self.k, self.m, self.n);
                self.b.accumulate_grad(Array1::from(grad_b));
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}
