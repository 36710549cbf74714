//! evonet: LSTM policy networks for evolution strategies, in pure Rust.
//!
//! An [`LstmNetwork`](network::LstmNetwork) is an LSTM cell followed by one
//! of four output heads (identity, tanh, categorical sampling, gaussian
//! sampling). Evolution strategies evaluate it as a black box: the
//! [`ParameterReshaper`](reshape::ParameterReshaper) writes a flat
//! candidate vector into the network, and [`step`](network::LstmNetwork::step)
//! advances a caller-owned carry one time step at a time.
//!
//! # Quick Start
//!
//! ```
//! use evonet::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = LstmConfig::new()
//!     .with_hidden_units(8)
//!     .with_output_units(3)
//!     .with_output_activation_name("categorical")
//!     .unwrap();
//! let template = LstmNetwork::new(config, 4, &mut StdRng::seed_from_u64(0)).unwrap();
//!
//! // One population member from an ES optimizer
//! let reshaper = ParameterReshaper::new(&template);
//! let member = vec![0.05; reshaper.total_params()];
//! let nets = reshaper.load_population(&template, &[member]).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let inputs = vec![Tensor::from_slice(&[0.0, 1.0, 0.0, 1.0]); 5];
//! let (_, actions) = nets[0].unroll(&nets[0].initialize_carry(), &inputs, &mut rng).unwrap();
//! assert_eq!(actions.len(), 5);
//! assert!(actions.iter().all(|a| a.data().iter().sum::<f32>() == 1.0));
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: Dense row-major tensor
//! - [`nn`]: Layers, LSTM cell, output heads, initializers
//! - [`config`]: Network configuration (serde/JSON)
//! - [`network`]: The LSTM network wrapper
//! - [`reshape`]: Flat parameter vectors for ES optimizers
//! - [`error`]: Error type

pub mod config;
pub mod error;
pub mod network;
pub mod nn;
pub mod prelude;
pub mod reshape;
pub mod tensor;

pub use error::{EvonetError, Result};
