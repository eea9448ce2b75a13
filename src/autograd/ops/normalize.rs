//! Normalization autograd operations: row-wise L2 normalization

use crate::autograd::{BackwardOp, GradCell, Tensor};
use crate::trace::{TraceStep, TRACER};
use ndarray::Array1;
use std::rc::Rc;

/// Default lower bound on the norm, matching common deep-learning frameworks
pub const NORM_EPS: f32 = 1e-12;

/// Normalize every row of a `rows x cols` matrix to unit L2 norm
///
/// y_i = x_i / max(||x_i||, eps)
pub fn l2_normalize_rows(x: &Tensor, rows: usize, cols: usize, eps: f32) -> Tensor {
    assert_eq!(x.len(), rows * cols, "l2_normalize_rows: shape mismatch");

    let (data, norms) = TRACER.span(TraceStep::Normalize, format!("{rows}x{cols}"), || {
        let src = x.data().as_slice().expect("tensor data is contiguous");
        let mut data = Vec::with_capacity(src.len());
        let mut norms = Vec::with_capacity(rows);
        for row in src.chunks(cols.max(1)) {
            let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            let denom = norm.max(eps);
            data.extend(row.iter().map(|v| v / denom));
            norms.push(norm);
        }
        (data, norms)
    });

    let requires_grad = x.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(L2NormalizeBackward {
            x: x.clone(),
            output: result.data().clone(),
            norms,
            cols,
            eps,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct L2NormalizeBackward {
    x: Tensor,
    output: Array1<f32>,
    norms: Vec<f32>,
    cols: usize,
    eps: f32,
    result_grad: GradCell,
}

impl BackwardOp for L2NormalizeBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if !self.x.requires_grad() {
                return;
            }
            let cols = self.cols.max(1);
            let y = self.output.as_slice().expect("normalize output is contiguous");
            let g = grad.as_slice().expect("gradient must be contiguous");

            let mut grad_x = Vec::with_capacity(y.len());
            for ((y_row, g_row), &norm) in y.chunks(cols).zip(g.chunks(cols)).zip(&self.norms) {
                if norm > self.eps {
                    // ∂L/∂x = (g - y (y·g)) / ||x||
                    let dot: f32 = y_row.iter().zip(g_row).map(|(a, b)| a * b).sum();
                    grad_x.extend(y_row.iter().zip(g_row).map(|(&yi, &gi)| (gi - yi * dot) / norm));
                } else {
                    // Clamped denominator is constant
                    grad_x.extend(g_row.iter().map(|&gi| gi / self.eps));
                }
            }
            self.x.accumulate_grad(Array1::from(grad_x));
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x]
    }
}
