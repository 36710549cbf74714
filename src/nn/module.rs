//! The [`Module`] trait shared by every layer.

use crate::tensor::Tensor;

/// A component holding learnable parameters.
///
/// The order returned by [`Module::parameters`] is stable for a given
/// architecture and defines the flat parameter layout used by
/// [`crate::reshape::ParameterReshaper`].
pub trait Module {
    /// All learnable parameters, in layout order.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Mutable access to all learnable parameters, in the same order.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Total number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}
