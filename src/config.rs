//! Network configuration.
//!
//! [`LstmConfig`] is the construction-time record for an
//! [`LstmNetwork`](crate::network::LstmNetwork). It is plain data: build it
//! with the `with_*` methods or load it from JSON, then hand it to the
//! network, which validates it once.

use serde::{Deserialize, Serialize};

use crate::error::{EvonetError, Result};
use crate::nn::OutputActivation;

/// Default hidden-state width.
pub const DEFAULT_HIDDEN_UNITS: usize = 32;
/// Default output width.
pub const DEFAULT_OUTPUT_UNITS: usize = 1;
/// Default display name.
pub const DEFAULT_MODEL_NAME: &str = "LSTM";

/// Configuration of an LSTM network with an output head.
///
/// # Example
///
/// ```
/// use evonet::config::LstmConfig;
/// use evonet::nn::OutputActivation;
///
/// let config = LstmConfig::new()
///     .with_hidden_units(16)
///     .with_output_units(4)
///     .with_output_activation(OutputActivation::Categorical);
/// assert!(config.validate().is_ok());
///
/// let parsed = LstmConfig::from_json(r#"{"num_output_units": 2, "output_activation": "tanh"}"#).unwrap();
/// assert_eq!(parsed.num_hidden_units, 32);
/// assert_eq!(parsed.output_activation, OutputActivation::Tanh);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmConfig {
    /// Width of the cell and hidden state
    pub num_hidden_units: usize,
    /// Width of the network output
    pub num_output_units: usize,
    /// Output head kind
    pub output_activation: OutputActivation,
    /// Display name
    pub model_name: String,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            num_hidden_units: DEFAULT_HIDDEN_UNITS,
            num_output_units: DEFAULT_OUTPUT_UNITS,
            output_activation: OutputActivation::default(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

/// JSON form of [`LstmConfig`] with the activation left as a name.
#[derive(Deserialize)]
#[serde(default)]
struct RawLstmConfig {
    num_hidden_units: usize,
    num_output_units: usize,
    output_activation: String,
    model_name: String,
}

impl Default for RawLstmConfig {
    fn default() -> Self {
        let defaults = LstmConfig::default();
        Self {
            num_hidden_units: defaults.num_hidden_units,
            num_output_units: defaults.num_output_units,
            output_activation: defaults.output_activation.to_string(),
            model_name: defaults.model_name,
        }
    }
}

impl LstmConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hidden-state width.
    #[must_use]
    pub fn with_hidden_units(mut self, units: usize) -> Self {
        self.num_hidden_units = units;
        self
    }

    /// Set the output width.
    #[must_use]
    pub fn with_output_units(mut self, units: usize) -> Self {
        self.num_output_units = units;
        self
    }

    /// Set the output head.
    #[must_use]
    pub fn with_output_activation(mut self, activation: OutputActivation) -> Self {
        self.output_activation = activation;
        self
    }

    /// Set the output head by name, rejecting unknown names.
    pub fn with_output_activation_name(mut self, name: &str) -> Result<Self> {
        self.output_activation = name.parse()?;
        Ok(self)
    }

    /// Set the display name.
    #[must_use]
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Check that both widths are non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.num_hidden_units == 0 {
            return Err(EvonetError::non_positive(
                "num_hidden_units",
                self.num_hidden_units,
            ));
        }
        if self.num_output_units == 0 {
            return Err(EvonetError::non_positive(
                "num_output_units",
                self.num_output_units,
            ));
        }
        Ok(())
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// An unknown `output_activation` is reported as
    /// [`EvonetError::UnsupportedActivation`], the same as
    /// [`LstmConfig::with_output_activation_name`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawLstmConfig = serde_json::from_str(json)?;
        let config = Self {
            num_hidden_units: raw.num_hidden_units,
            num_output_units: raw.num_output_units,
            output_activation: raw.output_activation.parse()?,
            model_name: raw.model_name,
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
