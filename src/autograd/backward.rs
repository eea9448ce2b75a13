//! Backward operation trait and graph traversal

use super::Tensor;
use std::collections::HashSet;

/// Gradient rule of a single differentiable operation
///
/// `backward` reads the result gradient captured at construction and
/// accumulates into the gradients of `inputs`. It must not recurse: the
/// traversal in [`run_backward`] visits every node exactly once.
pub trait BackwardOp {
    fn backward(&self);

    fn inputs(&self) -> Vec<&Tensor>;
}

/// Run every backward op reachable from `root`, consumers before producers
pub(crate) fn run_backward(root: &Tensor) {
    for node in topological_order(root).iter().rev() {
        if let Some(op) = node.backward_op() {
            op.backward();
        }
    }
}

/// Post-order over non-leaf nodes reachable from `root`
fn topological_order(root: &Tensor) -> Vec<Tensor> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    // (node, inputs already pushed)
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let Some(op) = node.backward_op() else {
            continue;
        };
        let inputs: Vec<Tensor> = op.inputs().into_iter().cloned().collect();
        stack.push((node, true));
        for input in inputs {
            if !input.is_leaf() && !visited.contains(&input.node_id()) {
                stack.push((input, false));
            }
        }
    }

    order
}
