//! Activation autograd operations: row-wise softmax, natural log

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::{Array1, ArrayView2, Axis};
use std::rc::Rc;

/// Softmax over each row of a `rows x cols` matrix
///
/// Numerically stable: every row is shifted by its maximum before `exp`.
pub fn softmax_rows(a: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(a.len(), rows * cols, "softmax_rows: shape mismatch");

    let mut out = Vec::with_capacity(rows * cols);
    for row in a.data().as_slice().expect("tensor data is contiguous").chunks(cols.max(1)) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = row.iter().map(|&x| (x - max).exp()).collect();
        let total: f32 = exps.iter().sum();
        out.extend(exps.into_iter().map(|e| e / total));
    }

    let requires_grad = a.requires_grad();
    let mut result = Tensor::new(Array1::from(out), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SoftmaxRowsBackward {
            a: a.clone(),
            output: result.data().clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SoftmaxRowsBackward {
    a: Tensor,
    output: Array1<f32>,
    rows: usize,
    cols: usize,
    result_grad: GradCell,
}

impl BackwardOp for SoftmaxRowsBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                let shape = (self.rows, self.cols);
                let y = ArrayView2::from_shape(shape, self.output.as_slice().unwrap_or(&[]))
                    .expect("softmax output matches recorded shape");
                let g = ArrayView2::from_shape(shape, grad.as_slice().unwrap_or(&[]))
                    .expect("softmax grad matches recorded shape");

                // ∂L/∂x_i = y_i * (g_i - Σ_j g_j y_j)
                let dot = (&g * &y).sum_axis(Axis(1)).insert_axis(Axis(1));
                let grad_a = &y * &(&g - &dot);
                self.a.accumulate_grad(grad_a.iter().copied().collect::<Array1<f32>>());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

/// Natural logarithm (inputs must be positive)
pub fn ln(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::ln);
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LnBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct LnBackward {
    a: Tensor,
    result_grad: GradCell,
}

impl BackwardOp for LnBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out / a
                self.a.accumulate_grad(grad / self.a.data());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}
