//! Weight initialization functions.
//!
//! Every initializer draws from a caller-supplied RNG so that a whole
//! network is reproducible from a single seed:
//!
//! - LeCun normal (LeCun et al., 1998) for input kernels
//! - Orthogonal (Saxe et al., 2014) for recurrent kernels
//! - Uniform `[0, 0.05)` for biases ([`default_bias_init`])
//!
//! # References
//!
//! - LeCun, Y., et al. (1998). Efficient BackProp. Neural Networks: Tricks of the Trade.
//! - Saxe, A., et al. (2014). Exact solutions to the nonlinear dynamics of
//!   learning in deep linear neural networks. ICLR.

use rand::Rng;

use super::functional::standard_normal;
use crate::tensor::Tensor;

/// Upper bound of the default bias distribution.
pub const DEFAULT_BIAS_SCALE: f32 = 0.05;

/// Uniform distribution initialization.
///
/// Samples from U(low, high).
///
/// # Panics
///
/// Panics if `low >= high` and `shape` has at least one element.
pub fn uniform<R: Rng + ?Sized>(shape: &[usize], low: f32, high: f32, rng: &mut R) -> Tensor {
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    Tensor::new(&data, shape)
}

/// Bias initialization shared by every layer: U(0, 0.05).
pub fn default_bias_init<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Tensor {
    uniform(shape, 0.0, DEFAULT_BIAS_SCALE, rng)
}

/// Normal distribution initialization.
///
/// Samples from N(mean, std).
pub fn normal<R: Rng + ?Sized>(shape: &[usize], mean: f32, std: f32, rng: &mut R) -> Tensor {
    let numel: usize = shape.iter().product();
    let data: Vec<f32> = (0..numel)
        .map(|_| mean + std * standard_normal(rng))
        .collect();
    Tensor::new(&data, shape)
}

/// LeCun normal initialization.
///
/// Samples from N(0, std) where std = sqrt(1 / `fan_in`).
pub fn lecun_normal<R: Rng + ?Sized>(shape: &[usize], fan_in: usize, rng: &mut R) -> Tensor {
    let std = (1.0 / fan_in.max(1) as f32).sqrt();
    normal(shape, 0.0, std, rng)
}

/// Orthogonal initialization for a `[rows, cols]` matrix.
///
/// Draws a gaussian matrix and orthonormalizes it with modified
/// Gram-Schmidt. When `rows >= cols` the columns are orthonormal,
/// otherwise the rows are.
pub fn orthogonal<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Tensor {
    // Orthonormalize the longer side's vectors of a [n, m] matrix with n >= m,
    // stored as m vectors of length n.
    let (n, m) = if rows >= cols { (rows, cols) } else { (cols, rows) };
    let mut vectors: Vec<Vec<f32>> = (0..m)
        .map(|_| (0..n).map(|_| standard_normal(rng)).collect())
        .collect();

    for j in 0..m {
        for k in 0..j {
            let (done, rest) = vectors.split_at_mut(j);
            let proj = dot(&rest[0], &done[k]);
            for (v, q) in rest[0].iter_mut().zip(&done[k]) {
                *v -= proj * q;
            }
        }
        let norm = dot(&vectors[j], &vectors[j]).sqrt();
        if norm > f32::EPSILON {
            for v in &mut vectors[j] {
                *v /= norm;
            }
        }
    }

    let mut data = vec![0.0; rows * cols];
    for (j, vector) in vectors.iter().enumerate() {
        for (i, &value) in vector.iter().enumerate() {
            if rows >= cols {
                // vector j is column j
                data[i * cols + j] = value;
            } else {
                // vector j is row j
                data[j * cols + i] = value;
            }
        }
    }
    Tensor::new(&data, &[rows, cols])
}

/// Zeros initialization.
pub fn zeros(shape: &[usize]) -> Tensor {
    Tensor::zeros(shape)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_bias_init_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let t = default_bias_init(&[1000], &mut rng);
        for &val in t.data() {
            assert!(
                (0.0..DEFAULT_BIAS_SCALE).contains(&val),
                "Value {val} out of bounds [0, {DEFAULT_BIAS_SCALE})"
            );
        }
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn test_uniform_empty_range_panics() {
        let _ = uniform(&[4], 1.0, 1.0, &mut StdRng::seed_from_u64(0));
    }

    #[test]
    fn test_uniform_reproducible() {
        let t1 = uniform(&[10, 10], -1.0, 1.0, &mut StdRng::seed_from_u64(7));
        let t2 = uniform(&[10, 10], -1.0, 1.0, &mut StdRng::seed_from_u64(7));
        assert_eq!(t1.data(), t2.data());
    }

    #[test]
    fn test_lecun_normal_distribution() {
        let mut rng = StdRng::seed_from_u64(42);
        let t = lecun_normal(&[10000], 100, &mut rng);
        let expected_std = (1.0 / 100.0_f32).sqrt();

        let mean: f32 = t.data().iter().sum::<f32>() / t.numel() as f32;
        assert!(mean.abs() < 0.01, "Mean {mean} too far from 0");

        let variance: f32 =
            t.data().iter().map(|x| (x - mean).powi(2)).sum::<f32>() / t.numel() as f32;
        let actual_std = variance.sqrt();
        assert!(
            (actual_std - expected_std).abs() < 0.01,
            "Std {actual_std} too far from {expected_std}"
        );
    }

    fn assert_orthonormal_columns(t: &Tensor) {
        let (rows, cols) = (t.shape()[0], t.shape()[1]);
        for a in 0..cols {
            for b in 0..cols {
                let d: f32 = (0..rows)
                    .map(|i| t.data()[i * cols + a] * t.data()[i * cols + b])
                    .sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!(
                    (d - expected).abs() < 1e-4,
                    "columns {a},{b}: dot {d}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn test_orthogonal_square() {
        let mut rng = StdRng::seed_from_u64(3);
        let t = orthogonal(16, 16, &mut rng);
        assert_eq!(t.shape(), &[16, 16]);
        assert_orthonormal_columns(&t);
    }

    #[test]
    fn test_orthogonal_tall() {
        let mut rng = StdRng::seed_from_u64(5);
        let t = orthogonal(12, 4, &mut rng);
        assert_orthonormal_columns(&t);
    }

    #[test]
    fn test_orthogonal_wide_has_orthonormal_rows() {
        let mut rng = StdRng::seed_from_u64(11);
        let t = orthogonal(3, 8, &mut rng);
        let cols = 8;
        for a in 0..3 {
            for b in 0..3 {
                let d: f32 = (0..cols)
                    .map(|j| t.data()[a * cols + j] * t.data()[b * cols + j])
                    .sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((d - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_zeros() {
        let z = zeros(&[3, 3]);
        assert!(z.data().iter().all(|&x| x == 0.0));
    }
}
