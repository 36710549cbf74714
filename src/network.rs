//! LSTM network with a configurable output head.
//!
//! [`LstmNetwork`] is the unit an evolution strategy evaluates: an
//! [`LstmCell`] followed by an [`OutputHead`], built from an
//! [`LstmConfig`]. Each call to [`LstmNetwork::step`] advances the
//! caller-owned carry by one time step.
//!
//! # Example
//!
//! ```
//! use evonet::config::LstmConfig;
//! use evonet::network::LstmNetwork;
//! use evonet::nn::OutputActivation;
//! use evonet::tensor::Tensor;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = LstmConfig::new()
//!     .with_hidden_units(16)
//!     .with_output_units(2)
//!     .with_output_activation(OutputActivation::Tanh);
//! let net = LstmNetwork::new(config, 4, &mut StdRng::seed_from_u64(0)).unwrap();
//!
//! let carry = net.initialize_carry();
//! let x = Tensor::from_slice(&[0.1, 0.2, 0.3, 0.4]);
//! let (carry, y) = net.step(&carry, &x, &mut StdRng::seed_from_u64(1)).unwrap();
//! assert_eq!(y.shape(), &[2]);
//! assert_eq!(carry.hidden.shape(), &[16]);
//! ```

use rand::Rng;
use tracing::debug;

use crate::config::LstmConfig;
use crate::error::{EvonetError, Result};
use crate::nn::{LstmCarry, LstmCell, Module, OutputHead};
use crate::tensor::Tensor;

/// LSTM cell followed by an output head.
#[derive(Debug, Clone)]
pub struct LstmNetwork {
    config: LstmConfig,
    cell: LstmCell,
    head: OutputHead,
}

impl LstmNetwork {
    /// Build a network for inputs of width `input_size`, drawing all
    /// initial weights from `rng`.
    pub fn new<R: Rng + ?Sized>(config: LstmConfig, input_size: usize, rng: &mut R) -> Result<Self> {
        config.validate()?;
        if input_size == 0 {
            return Err(EvonetError::non_positive("input_size", input_size));
        }

        let cell = LstmCell::new(input_size, config.num_hidden_units, rng);
        let head = OutputHead::new(
            config.output_activation,
            config.num_hidden_units,
            config.num_output_units,
            rng,
        );
        let network = Self { config, cell, head };

        debug!(
            model = %network.config.model_name,
            input_size,
            hidden = network.config.num_hidden_units,
            outputs = network.config.num_output_units,
            activation = %network.config.output_activation,
            params = network.num_parameters(),
            "built lstm network"
        );
        Ok(network)
    }

    /// One time step: `(carry, x, rng) -> (carry', y)`.
    ///
    /// `x` is `[input_size]` or `[batch, input_size]` and must match the
    /// carry's batch layout. Only the categorical and gaussian heads draw
    /// from `rng`.
    pub fn step<R: Rng + ?Sized>(
        &self,
        carry: &LstmCarry,
        x: &Tensor,
        rng: &mut R,
    ) -> Result<(LstmCarry, Tensor)> {
        let (carry, h) = self.cell.step(carry, x)?;
        let y = self.head.apply(&h, rng)?;
        Ok((carry, y))
    }

    /// Apply [`LstmNetwork::step`] over a sequence of inputs.
    ///
    /// Returns the final carry and one output per input.
    pub fn unroll<R: Rng + ?Sized>(
        &self,
        carry: &LstmCarry,
        inputs: &[Tensor],
        rng: &mut R,
    ) -> Result<(LstmCarry, Vec<Tensor>)> {
        let mut carry = carry.clone();
        let mut outputs = Vec::with_capacity(inputs.len());
        for x in inputs {
            let (next, y) = self.step(&carry, x, rng)?;
            carry = next;
            outputs.push(y);
        }
        Ok((carry, outputs))
    }

    /// Zeroed carry of shape `[num_hidden_units]`.
    #[must_use]
    pub fn initialize_carry(&self) -> LstmCarry {
        self.cell.initialize_carry()
    }

    /// Zeroed carry of shape `[batch, num_hidden_units]`.
    #[must_use]
    pub fn initialize_carry_batched(&self, batch: usize) -> LstmCarry {
        self.cell.initialize_carry_batched(batch)
    }

    /// The configuration this network was built from.
    #[must_use]
    pub fn config(&self) -> &LstmConfig {
        &self.config
    }

    /// Display name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Input feature width.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.cell.input_size()
    }

    /// The recurrent cell.
    #[must_use]
    pub fn cell(&self) -> &LstmCell {
        &self.cell
    }

    /// The output head.
    #[must_use]
    pub fn head(&self) -> &OutputHead {
        &self.head
    }
}

impl Module for LstmNetwork {
    fn parameters(&self) -> Vec<&Tensor> {
        let mut p = self.cell.parameters();
        p.extend(self.head.parameters());
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p = self.cell.parameters_mut();
        p.extend(self.head.parameters_mut());
        p
    }
}
