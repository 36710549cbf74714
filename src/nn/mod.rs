//! Neural network building blocks.
//!
//! Everything here is gradient-free: layers hold plain tensors that an
//! evolution strategy overwrites through [`Module::parameters_mut`].
//!
//! # Architecture
//!
//! - **Layers**: [`Dense`], [`LstmCell`]
//! - **Heads**: [`OutputHead`] selected by [`OutputActivation`]
//! - **Initializers**: [`init`] (LeCun normal, orthogonal, default bias)
//! - **Functional**: [`functional`] activations and noise samplers
//!
//! # References
//!
//! - Hochreiter, S., & Schmidhuber, J. (1997). Long Short-Term Memory.
//! - Salimans, T., et al. (2017). Evolution Strategies as a Scalable
//!   Alternative to Reinforcement Learning. arXiv:1703.03864.

pub mod functional;
mod head;
pub mod init;
mod linear;
mod lstm;
mod module;

pub use functional as F;
pub use head::{OutputActivation, OutputHead};
pub use linear::Dense;
pub use lstm::{LstmCarry, LstmCell};
pub use module::Module;
