//! Pairwise squared Euclidean distances between two sets of row vectors

use crate::autograd::{BackwardOp, GradCell, Tensor};
use crate::trace::{TraceStep, TRACER};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::rc::Rc;

/// Distances between `x` (n×d) and `e` (k×d), returned as an n×k matrix
///
/// d_ij = ||x_i||² + ||e_j||² - 2 x_i·e_j
pub fn squared_distances(x: &Tensor, e: &Tensor, n: usize, k: usize, d: usize) -> Tensor {
    assert_eq!(x.len(), n * d, "squared_distances: x shape mismatch");
    assert_eq!(e.len(), k * d, "squared_distances: e shape mismatch");

    let data = TRACER.span(TraceStep::Distance, format!("{n}x{k}x{d}"), || {
        let xv = view(x, n, d);
        let ev = view(e, k, d);
        let x_sq = xv.map_axis(Axis(1), |r| r.dot(&r)).insert_axis(Axis(1));
        let e_sq = ev.map_axis(Axis(1), |r| r.dot(&r)).insert_axis(Axis(0));
        let cross = xv.dot(&ev.t());
        let dist: Array2<f32> = &x_sq + &e_sq - &(cross * 2.0);
        dist.iter().copied().collect::<Array1<f32>>()
    });

    let requires_grad = x.requires_grad() || e.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SquaredDistancesBackward {
            x: x.clone(),
            e: e.clone(),
            n,
            k,
            d,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

fn view(t: &Tensor, rows: usize, cols: usize) -> ArrayView2<'_, f32> {
    ArrayView2::from_shape((rows, cols), t.data().as_slice().expect("tensor data is contiguous"))
        .expect("shape checked by caller")
}

struct SquaredDistancesBackward {
    x: Tensor,
    e: Tensor,
    n: usize,
    k: usize,
    d: usize,
    result_grad: GradCell,
}

impl BackwardOp for SquaredDistancesBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let g = ArrayView2::from_shape(
                (self.n, self.k),
                grad.as_slice().expect("gradient must be contiguous"),
            )
            .expect("gradient matches recorded shape");
            let xv = view(&self.x, self.n, self.d);
            let ev = view(&self.e, self.k, self.d);

            if self.x.requires_grad() {
                // ∂L/∂x_i = 2 (Σ_j g_ij) x_i - 2 Σ_j g_ij e_j
                let row_sums = g.sum_axis(Axis(1)).insert_axis(Axis(1));
                let grad_x = (&xv * &row_sums - g.dot(&ev)) * 2.0;
                self.x.accumulate_grad(grad_x.iter().copied().collect::<Array1<f32>>());
            }

            if self.e.requires_grad() {
                // ∂L/∂e_j = 2 (Σ_i g_ij) e_j - 2 Σ_i g_ij x_i
                let col_sums = g.sum_axis(Axis(0)).insert_axis(Axis(1));
                let grad_e = (&ev * &col_sums - g.t().dot(&xv)) * 2.0;
                self.e.accumulate_grad(grad_e.iter().copied().collect::<Array1<f32>>());
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.x, &self.e]
    }
}
