//! Property-based tests for matrix multiplication

use super::test_utils::{finite_difference, probe_weights, project};
use crate::autograd::{backward, matmul, transpose, Tensor};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_matmul_backward_gradient_check(
        m in 1usize..4,
        k in 1usize..4,
        n in 1usize..4,
        seed_a in prop::collection::vec(-3.0f32..3.0, 16),
        seed_b in prop::collection::vec(-3.0f32..3.0, 16)
    ) {
        let a_data = seed_a[..m * k].to_vec();
        let b_data = seed_b[..k * n].to_vec();
        let w = probe_weights(m * n);

        let a = Tensor::from_vec(a_data.clone(), true);
        let b = Tensor::from_vec(b_data.clone(), true);
        let mut c = matmul(&a, &b, m, k, n);
        backward(&mut c, Some(ndarray::Array1::from(w.clone())));

        let grad_a = a.grad().expect("gradient should be available");
        let numerical_a = finite_difference(
            |x| {
                let ta = Tensor::from_vec(x.to_vec(), false);
                let tb = Tensor::from_vec(b_data.clone(), false);
                project(matmul(&ta, &tb, m, k, n).data(), &w)
            },
            &a_data,
            1e-2,
        );
        for i in 0..a_data.len() {
            prop_assert!((grad_a[i] - numerical_a[i]).abs() < 0.05);
        }

        let grad_b = b.grad().expect("gradient should be available");
        let numerical_b = finite_difference(
            |x| {
                let ta = Tensor::from_vec(a_data.clone(), false);
                let tb = Tensor::from_vec(x.to_vec(), false);
                project(matmul(&ta, &tb, m, k, n).data(), &w)
            },
            &b_data,
            1e-2,
        );
        for i in 0..b_data.len() {
            prop_assert!((grad_b[i] - numerical_b[i]).abs() < 0.05);
        }
    }

    #[test]
    fn prop_transpose_involution(
        rows in 1usize..6,
        cols in 1usize..6,
        seed in prop::collection::vec(-10.0f32..10.0, 36)
    ) {
        let data = seed[..rows * cols].to_vec();
        let back = transpose(&transpose(&data, rows, cols), cols, rows);
        prop_assert_eq!(back, data);
    }
}
