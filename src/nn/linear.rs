//! Fully connected (dense) layer.
//!
//! Implements the transformation y = xW^T + b.

use rand::Rng;

use super::init::{default_bias_init, lecun_normal, orthogonal};
use super::module::Module;
use crate::error::{EvonetError, Result};
use crate::tensor::Tensor;

/// Fully connected layer: y = xW^T + b
///
/// Kernel is LeCun-normal, bias is U(0, 0.05).
///
/// # Shape
///
/// - Input: `(*, in_features)` where `*` means any number of batch dimensions
/// - Output: `(*, out_features)`
///
/// # Example
///
/// ```
/// use evonet::nn::Dense;
/// use evonet::tensor::Tensor;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let layer = Dense::new(20, 30, &mut rng);
/// let x = Tensor::zeros(&[4, 20]);
/// let output = layer.forward(&x).unwrap();
/// assert_eq!(output.shape(), &[4, 30]);
/// ```
#[derive(Clone)]
pub struct Dense {
    /// Weight matrix, shape: [out_features, in_features]
    weight: Tensor,

    /// Bias vector, shape: [out_features], or None if bias=false
    bias: Option<Tensor>,

    in_features: usize,
    out_features: usize,
}

impl Dense {
    /// Create a new Dense layer drawing its weights from `rng`.
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let weight = lecun_normal(&[out_features, in_features], in_features, rng);
        let bias = default_bias_init(&[out_features], rng);

        Self {
            weight,
            bias: Some(bias),
            in_features,
            out_features,
        }
    }

    /// Create a Dense layer without bias.
    pub fn without_bias<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            weight: lecun_normal(&[out_features, in_features], in_features, rng),
            bias: None,
            in_features,
            out_features,
        }
    }

    /// Square recurrent layer: orthogonal kernel, default bias.
    pub(crate) fn orthogonal<R: Rng + ?Sized>(features: usize, rng: &mut R) -> Self {
        Self {
            weight: orthogonal(features, features, rng),
            bias: Some(default_bias_init(&[features], rng)),
            in_features: features,
            out_features: features,
        }
    }

    /// Build a layer from an explicit `[out, in]` weight and optional `[out]` bias.
    pub fn from_tensors(weight: Tensor, bias: Option<Tensor>) -> Result<Self> {
        if weight.ndim() != 2 {
            return Err(EvonetError::dimension_mismatch(
                "dense weight rank",
                2,
                weight.ndim(),
            ));
        }
        let (out_features, in_features) = (weight.shape()[0], weight.shape()[1]);
        let mut layer = Self {
            weight,
            bias: None,
            in_features,
            out_features,
        };
        if let Some(b) = bias {
            layer.set_bias(b)?;
        }
        Ok(layer)
    }

    /// Get the input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get the output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Check if this layer has a bias term.
    #[must_use]
    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Get reference to weight tensor.
    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Get reference to bias tensor if present.
    #[must_use]
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Replace the weight matrix. Shape must be `[out_features, in_features]`.
    pub fn set_weight(&mut self, weight: Tensor) -> Result<()> {
        if weight.shape() != [self.out_features, self.in_features] {
            return Err(EvonetError::dimension_mismatch(
                "dense weight",
                self.out_features * self.in_features,
                weight.numel(),
            ));
        }
        self.weight = weight;
        Ok(())
    }

    /// Replace the bias vector. Shape must be `[out_features]`.
    pub fn set_bias(&mut self, bias: Tensor) -> Result<()> {
        if bias.shape() != [self.out_features] {
            return Err(EvonetError::dimension_mismatch(
                "dense bias",
                self.out_features,
                bias.numel(),
            ));
        }
        self.bias = Some(bias);
        Ok(())
    }

    /// Forward pass over `(*, in_features)`.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        if input.last_dim() != self.in_features {
            return Err(EvonetError::dimension_mismatch(
                "dense input",
                self.in_features,
                input.last_dim(),
            ));
        }
        let data = affine(input, &self.weight, self.bias.as_ref());

        let mut shape = input.shape().to_vec();
        match shape.last_mut() {
            Some(last) => *last = self.out_features,
            None => shape.push(self.out_features),
        }
        Tensor::try_new(data, &shape)
    }
}

/// Row-wise `x W^T + b` for a weight of shape `[out, in]`.
///
/// Callers check that the input's last dimension equals `in`.
pub(crate) fn affine(input: &Tensor, weight: &Tensor, bias: Option<&Tensor>) -> Vec<f32> {
    let out = weight.shape()[0];
    let inp = weight.shape()[1];
    let w = weight.data();

    let mut data = Vec::with_capacity(input.rows() * out);
    for row in input.row_iter() {
        for o in 0..out {
            let w_row = &w[o * inp..(o + 1) * inp];
            let mut acc: f32 = row.iter().zip(w_row).map(|(x, w)| x * w).sum();
            if let Some(b) = bias {
                acc += b.data()[o];
            }
            data.push(acc);
        }
    }
    data
}

impl Module for Dense {
    fn parameters(&self) -> Vec<&Tensor> {
        match &self.bias {
            Some(b) => vec![&self.weight, b],
            None => vec![&self.weight],
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match &mut self.bias {
            Some(b) => vec![&mut self.weight, b],
            None => vec![&mut self.weight],
        }
    }
}

impl std::fmt::Debug for Dense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dense")
            .field("in_features", &self.in_features)
            .field("out_features", &self.out_features)
            .field("bias", &self.bias.is_some())
            .finish_non_exhaustive()
    }
}
