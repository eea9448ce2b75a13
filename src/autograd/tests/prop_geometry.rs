//! Property-based tests for normalization, distances and embedding lookup

use super::test_utils::{finite_difference, probe_weights, project};
use crate::autograd::{backward, embedding, l2_normalize_rows, squared_distances, Tensor, NORM_EPS};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_normalized_rows_have_unit_norm(
        rows in 1usize..5,
        cols in 1usize..6,
        seed in prop::collection::vec(0.5f32..5.0, 30),
        signs in prop::collection::vec(any::<bool>(), 30)
    ) {
        let x: Vec<f32> = seed.iter().zip(&signs)
            .take(rows * cols)
            .map(|(&v, &neg)| if neg { -v } else { v })
            .collect();
        let y = l2_normalize_rows(&Tensor::from_vec(x, false), rows, cols, NORM_EPS);

        for row in y.data().as_slice().unwrap().chunks(cols) {
            let norm: f32 = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            prop_assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn prop_normalize_backward_gradient_check(
        rows in 1usize..4,
        cols in 2usize..5,
        seed in prop::collection::vec(0.5f32..3.0, 20),
        signs in prop::collection::vec(any::<bool>(), 20)
    ) {
        let x: Vec<f32> = seed.iter().zip(&signs)
            .take(rows * cols)
            .map(|(&v, &neg)| if neg { -v } else { v })
            .collect();
        let w = probe_weights(rows * cols);

        let a = Tensor::from_vec(x.clone(), true);
        let mut y = l2_normalize_rows(&a, rows, cols, NORM_EPS);
        backward(&mut y, Some(ndarray::Array1::from(w.clone())));

        let analytical = a.grad().expect("gradient should be available");
        let numerical = finite_difference(
            |x_val| {
                let t = Tensor::from_vec(x_val.to_vec(), false);
                project(l2_normalize_rows(&t, rows, cols, NORM_EPS).data(), &w)
            },
            &x,
            1e-3,
        );

        for i in 0..x.len() {
            let diff = (analytical[i] - numerical[i]).abs();
            prop_assert!(diff < 0.02, "Gradient mismatch at index {}: analytical={}, numerical={}",
                        i, analytical[i], numerical[i]);
        }
    }

    #[test]
    fn prop_squared_distances_match_direct(
        n in 1usize..4,
        k in 1usize..5,
        d in 1usize..4,
        xs in prop::collection::vec(-3.0f32..3.0, 12),
        es in prop::collection::vec(-3.0f32..3.0, 16)
    ) {
        let x = xs[..n * d].to_vec();
        let e = es[..k * d].to_vec();
        let dist = squared_distances(
            &Tensor::from_vec(x.clone(), false),
            &Tensor::from_vec(e.clone(), false),
            n, k, d,
        );

        for i in 0..n {
            for j in 0..k {
                let direct: f32 = (0..d).map(|c| (x[i * d + c] - e[j * d + c]).powi(2)).sum();
                prop_assert!((dist.data()[i * k + j] - direct).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn prop_squared_distances_backward_gradient_check(
        xs in prop::collection::vec(-2.0f32..2.0, 6),
        es in prop::collection::vec(-2.0f32..2.0, 6)
    ) {
        let (n, k, d) = (3, 3, 2);
        let w = probe_weights(n * k);

        let x = Tensor::from_vec(xs.clone(), true);
        let e = Tensor::from_vec(es.clone(), true);
        let mut dist = squared_distances(&x, &e, n, k, d);
        backward(&mut dist, Some(ndarray::Array1::from(w.clone())));

        let grad_x = x.grad().expect("gradient should be available");
        let numerical_x = finite_difference(
            |v| {
                let tx = Tensor::from_vec(v.to_vec(), false);
                let te = Tensor::from_vec(es.clone(), false);
                project(squared_distances(&tx, &te, n, k, d).data(), &w)
            },
            &xs,
            1e-2,
        );
        for i in 0..xs.len() {
            prop_assert!((grad_x[i] - numerical_x[i]).abs() < 0.05);
        }

        let grad_e = e.grad().expect("gradient should be available");
        let numerical_e = finite_difference(
            |v| {
                let tx = Tensor::from_vec(xs.clone(), false);
                let te = Tensor::from_vec(v.to_vec(), false);
                project(squared_distances(&tx, &te, n, k, d).data(), &w)
            },
            &es,
            1e-2,
        );
        for i in 0..es.len() {
            prop_assert!((grad_e[i] - numerical_e[i]).abs() < 0.05);
        }
    }

    #[test]
    fn prop_embedding_gradient_counts_uses(
        indices in prop::collection::vec(0usize..5, 1..20)
    ) {
        let dim = 2;
        let table = Tensor::from_vec(vec![0.0; 5 * dim], true);
        let mut out = embedding(&table, &indices, dim);
        let len = out.len();
        backward(&mut out, Some(ndarray::Array1::ones(len)));

        let grad = table.grad().unwrap();
        for row in 0..5 {
            let uses = indices.iter().filter(|&&i| i == row).count() as f32;
            prop_assert_eq!(grad[row * dim], uses);
            prop_assert_eq!(grad[row * dim + 1], uses);
        }
    }
}
