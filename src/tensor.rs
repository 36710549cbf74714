//! Dense row-major tensor.
//!
//! Evolution strategies never differentiate through the network, so this
//! tensor carries only data and shape. The last dimension is the feature
//! dimension; everything before it is treated as a batch of rows.

use std::fmt;

use crate::error::{EvonetError, Result};

/// A dense `f32` tensor stored in row-major order.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    /// Underlying data storage
    data: Vec<f32>,

    /// Shape of the tensor
    shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor from a slice with the given shape.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the product of shape dimensions.
    /// Use [`Tensor::try_new`] for untrusted input.
    #[must_use]
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected_len: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_len,
            "Data length {} doesn't match shape {:?} (expected {})",
            data.len(),
            shape,
            expected_len
        );

        Self {
            data: data.to_vec(),
            shape: shape.to_vec(),
        }
    }

    /// Create a tensor from owned data, checking the length against the shape.
    pub fn try_new(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let expected_len: usize = shape.iter().product();
        if data.len() != expected_len {
            return Err(EvonetError::dimension_mismatch(
                "tensor data",
                expected_len,
                data.len(),
            ));
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// Create a tensor from a 1D slice (vector).
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self::new(data, &[data.len()])
    }

    /// Create a tensor filled with zeros.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        let len: usize = shape.iter().product();
        Self {
            data: vec![0.0; len],
            shape: shape.to_vec(),
        }
    }

    /// Create a tensor with the same shape as another, filled with zeros.
    #[must_use]
    pub fn zeros_like(other: &Tensor) -> Self {
        Self::zeros(&other.shape)
    }

    /// Get the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Get the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Size of the last (feature) dimension; 1 for a scalar.
    #[must_use]
    pub fn last_dim(&self) -> usize {
        self.shape.last().copied().unwrap_or(1)
    }

    /// Number of rows when viewed as `[rows, last_dim]`.
    #[must_use]
    pub fn rows(&self) -> usize {
        match self.last_dim() {
            0 => 0,
            d => self.numel() / d,
        }
    }

    /// Get a reference to the underlying data.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a mutable reference to the underlying data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume the tensor and return its data.
    #[must_use]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Iterate over rows of the last dimension.
    pub fn row_iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks(self.last_dim().max(1))
    }

    /// Apply a function elementwise, returning a new tensor.
    #[must_use]
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Elementwise sum. Shapes must match.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_with(other, "tensor add", |a, b| a + b)
    }

    /// Elementwise (Hadamard) product. Shapes must match.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor> {
        self.zip_with(other, "tensor mul", |a, b| a * b)
    }

    /// Index of the largest element in each row.
    #[must_use]
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.row_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
                        if v > best.1 {
                            (i, v)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect()
    }

    fn zip_with(
        &self,
        other: &Tensor,
        context: &str,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Tensor> {
        if self.shape != other.shape {
            return Err(EvonetError::dimension_mismatch(
                &format!("{context} {:?} vs {:?}", self.shape, other.shape),
                self.last_dim(),
                other.last_dim(),
            ));
        }
        Ok(Self {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            shape: self.shape.clone(),
        })
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data", &self.data)
            .finish()
    }
}
