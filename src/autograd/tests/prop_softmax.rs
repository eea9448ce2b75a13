//! Property-based tests for row softmax and log

use super::test_utils::{finite_difference, probe_weights, project};
use crate::autograd::{backward, ln, softmax_rows, Tensor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_softmax_rows_backward_gradient_check(
        rows in 1usize..4,
        cols in 2usize..6,
        seed in prop::collection::vec(-5.0f32..5.0, 24)
    ) {
        let x: Vec<f32> = seed[..rows * cols].to_vec();
        let w = probe_weights(rows * cols);

        let a = Tensor::from_vec(x.clone(), true);
        let mut y = softmax_rows(&a, rows, cols);
        backward(&mut y, Some(ndarray::Array1::from(w.clone())));

        let analytical = a.grad().expect("gradient should be available");
        let numerical = finite_difference(
            |x_val| {
                let t = Tensor::from_vec(x_val.to_vec(), false);
                project(softmax_rows(&t, rows, cols).data(), &w)
            },
            &x,
            1e-3,
        );

        for i in 0..x.len() {
            let diff = (analytical[i] - numerical[i]).abs();
            prop_assert!(diff < 0.01, "Gradient mismatch at index {}: analytical={}, numerical={}",
                        i, analytical[i], numerical[i]);
        }
    }

    #[test]
    fn prop_softmax_rows_each_sum_to_one(
        rows in 1usize..5,
        cols in 1usize..10,
        seed in prop::collection::vec(-30.0f32..30.0, 50)
    ) {
        let a = Tensor::from_vec(seed[..rows * cols].to_vec(), false);
        let y = softmax_rows(&a, rows, cols);

        for row in y.data().as_slice().unwrap().chunks(cols) {
            let sum: f32 = row.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-5);
            prop_assert!(row.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn prop_ln_backward_is_reciprocal(
        x in prop::collection::vec(0.1f32..10.0, 1..20)
    ) {
        let a = Tensor::from_vec(x.clone(), true);
        let mut y = ln(&a);
        let len = y.len();
        backward(&mut y, Some(ndarray::Array1::ones(len)));

        let grad = a.grad().expect("gradient should be available");
        for i in 0..x.len() {
            prop_assert!((grad[i] - 1.0 / x[i]).abs() < 1e-4);
        }
    }
}
