//! Embedding lookup: row gather with scatter-add backward

use crate::autograd::{BackwardOp, GradCell, Tensor};
use crate::trace::{TraceStep, TRACER};
use ndarray::Array1;
use std::rc::Rc;

/// Gather rows `indices` from a `num_rows x dim` table
///
/// Panics if an index is out of range; callers validate user-provided
/// indices beforehand.
pub fn embedding(weight: &Tensor, indices: &[usize], dim: usize) -> Tensor {
    let num_rows = if dim == 0 { 0 } else { weight.len() / dim };
    assert_eq!(weight.len(), num_rows * dim, "embedding: table shape mismatch");

    let data = TRACER.span(TraceStep::Lookup, format!("{} rows", indices.len()), || {
        let table = weight.data().as_slice().expect("embedding table is contiguous");
        let mut data = Vec::with_capacity(indices.len() * dim);
        for &idx in indices {
            assert!(idx < num_rows, "embedding: index {idx} out of range for {num_rows} rows");
            data.extend_from_slice(&table[idx * dim..(idx + 1) * dim]);
        }
        data
    });

    let requires_grad = weight.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(EmbeddingBackward {
            weight: weight.clone(),
            indices: indices.to_vec(),
            dim,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct EmbeddingBackward {
    weight: Tensor,
    indices: Vec<usize>,
    dim: usize,
    result_grad: GradCell,
}

impl BackwardOp for EmbeddingBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.weight.requires_grad() {
                let mut grad_w = Array1::zeros(self.weight.len());
                for (pos, &idx) in self.indices.iter().enumerate() {
                    for j in 0..self.dim {
                        grad_w[idx * self.dim + j] += grad[pos * self.dim + j];
                    }
                }
                self.weight.accumulate_grad(grad_w);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.weight]
    }
}
