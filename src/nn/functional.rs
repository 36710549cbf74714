//! Functional interface for neural network operations.
//!
//! Stateless activations and the two noise primitives the stochastic
//! output heads sample from.

use std::f32::consts::PI;

use rand::Rng;

use crate::tensor::Tensor;

/// Sigmoid activation: 1 / (1 + exp(-x))
#[must_use]
pub fn sigmoid(x: &Tensor) -> Tensor {
    x.map(sigmoid_scalar)
}

/// Scalar sigmoid: σ(x) = 1 / (1 + exp(-x))
#[inline]
#[must_use]
pub fn sigmoid_scalar(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Hyperbolic tangent activation.
#[must_use]
pub fn tanh(x: &Tensor) -> Tensor {
    x.map(f32::tanh)
}

/// Row-wise softmax over the last dimension.
///
/// Subtracts the row maximum before exponentiating.
#[must_use]
pub fn softmax(x: &Tensor) -> Tensor {
    let mut data = Vec::with_capacity(x.numel());
    for row in x.row_iter() {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let start = data.len();
        data.extend(row.iter().map(|&v| (v - max).exp()));
        let sum: f32 = data[start..].iter().sum();
        for v in &mut data[start..] {
            *v /= sum;
        }
    }
    Tensor::new(&data, x.shape())
}

/// Sample a standard normal value using the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u1: f32 = rng.gen_range(f32::MIN_POSITIVE..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Sample a standard Gumbel value: -ln(-ln(u)).
pub fn gumbel<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u: f32 = rng.gen_range(f32::MIN_POSITIVE..1.0);
    -(-u.ln()).ln()
}
