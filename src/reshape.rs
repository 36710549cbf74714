//! Flat parameter vectors.
//!
//! Evolution strategies search over a single `Vec<f32>`. The
//! [`ParameterReshaper`] records the parameter layout of a [`Module`] so a
//! population member can be written into a network and read back out.
//!
//! # Example
//!
//! ```
//! use evonet::config::LstmConfig;
//! use evonet::network::LstmNetwork;
//! use evonet::nn::Module;
//! use evonet::reshape::ParameterReshaper;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut net = LstmNetwork::new(LstmConfig::new().with_hidden_units(4), 2, &mut StdRng::seed_from_u64(0)).unwrap();
//! let reshaper = ParameterReshaper::new(&net);
//! assert_eq!(reshaper.total_params(), net.num_parameters());
//!
//! let candidate = vec![0.01; reshaper.total_params()];
//! reshaper.load_into(&mut net, &candidate).unwrap();
//! assert_eq!(reshaper.flatten(&net), candidate);
//! ```

use tracing::debug;

use crate::error::{EvonetError, Result};
use crate::network::LstmNetwork;
use crate::nn::Module;
use crate::tensor::Tensor;

/// Layout of a module's parameters inside a flat vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterReshaper {
    shapes: Vec<Vec<usize>>,
    total: usize,
}

impl ParameterReshaper {
    /// Record the parameter layout of `module`.
    pub fn new<M: Module + ?Sized>(module: &M) -> Self {
        let shapes: Vec<Vec<usize>> = module
            .parameters()
            .iter()
            .map(|p| p.shape().to_vec())
            .collect();
        let total = module.num_parameters();
        Self { shapes, total }
    }

    /// Length of the flat vector.
    #[must_use]
    pub fn total_params(&self) -> usize {
        self.total
    }

    /// Shapes of the individual parameters, in layout order.
    #[must_use]
    pub fn shapes(&self) -> &[Vec<usize>] {
        &self.shapes
    }

    /// Concatenate all parameters of `module` in layout order.
    pub fn flatten<M: Module + ?Sized>(&self, module: &M) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.total);
        for p in module.parameters() {
            flat.extend_from_slice(p.data());
        }
        flat
    }

    /// Split a flat vector into tensors of the recorded shapes.
    pub fn unflatten(&self, flat: &[f32]) -> Result<Vec<Tensor>> {
        self.check_len(flat)?;
        let mut offset = 0;
        self.shapes
            .iter()
            .map(|shape| {
                let len: usize = shape.iter().product();
                let tensor = Tensor::new(&flat[offset..offset + len], shape);
                offset += len;
                Ok(tensor)
            })
            .collect()
    }

    /// Overwrite the parameters of `module` with `flat`.
    ///
    /// The module must have the layout this reshaper was built from. The
    /// layout is checked before anything is written, so on error `module`
    /// is left unchanged.
    pub fn load_into<M: Module + ?Sized>(&self, module: &mut M, flat: &[f32]) -> Result<()> {
        self.check_len(flat)?;
        self.check_layout(module)?;

        let mut offset = 0;
        for param in module.parameters_mut() {
            let len = param.numel();
            param.data_mut().copy_from_slice(&flat[offset..offset + len]);
            offset += len;
        }
        Ok(())
    }

    /// Build one network per population member by loading each flat
    /// vector into a clone of `template`.
    pub fn load_population(
        &self,
        template: &LstmNetwork,
        population: &[Vec<f32>],
    ) -> Result<Vec<LstmNetwork>> {
        let networks = population
            .iter()
            .map(|member| {
                let mut net = template.clone();
                self.load_into(&mut net, member)?;
                Ok(net)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            members = networks.len(),
            params = self.total,
            "loaded population"
        );
        Ok(networks)
    }

    fn check_layout<M: Module + ?Sized>(&self, module: &M) -> Result<()> {
        let params = module.parameters();
        if params.len() != self.shapes.len() {
            return Err(EvonetError::dimension_mismatch(
                "parameter count",
                self.shapes.len(),
                params.len(),
            ));
        }
        for (i, (param, shape)) in params.iter().zip(&self.shapes).enumerate() {
            if param.shape() != shape.as_slice() {
                return Err(EvonetError::dimension_mismatch(
                    &format!("parameter {i} shape {:?} vs {:?}", shape, param.shape()),
                    shape.iter().product(),
                    param.numel(),
                ));
            }
        }
        Ok(())
    }

    fn check_len(&self, flat: &[f32]) -> Result<()> {
        if flat.len() != self.total {
            return Err(EvonetError::dimension_mismatch(
                "flat parameters",
                self.total,
                flat.len(),
            ));
        }
        Ok(())
    }
}
