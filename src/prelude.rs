//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use evonet::prelude::*;
//! ```

pub use crate::config::LstmConfig;
pub use crate::error::EvonetError;
pub use crate::network::LstmNetwork;
pub use crate::nn::{LstmCarry, Module, OutputActivation};
pub use crate::reshape::ParameterReshaper;
pub use crate::tensor::Tensor;
