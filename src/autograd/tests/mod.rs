//! Tests for autograd operations with gradient checking

mod prop_geometry;
mod prop_matmul;
mod prop_softmax;
mod test_utils;
