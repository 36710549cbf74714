//! Error types for evonet operations.
//!
//! Every fallible operation in the crate returns [`Result`], so callers
//! running an evolution strategy can surface a bad configuration or a
//! malformed parameter vector instead of evaluating a broken network.

use thiserror::Error;

/// Main error type for evonet operations.
///
/// # Examples
///
/// ```
/// use evonet::error::EvonetError;
///
/// let err = EvonetError::UnsupportedActivation {
///     kind: "softplus".to_string(),
/// };
/// assert!(err.to_string().contains("softplus"));
/// ```
#[derive(Debug, Error)]
pub enum EvonetError {
    /// Output-activation name is not one of the supported heads.
    #[error("Unsupported output-activation kind: {kind} (expected identity, tanh, categorical or gaussian)")]
    UnsupportedActivation {
        /// Name that was requested
        kind: String,
    },

    /// Tensor, carry or parameter dimensions don't match.
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked
        context: String,
        /// Expected size
        expected: usize,
        /// Actual size found
        actual: usize,
    },

    /// Invalid hyperparameter value provided.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Configuration (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EvonetError {
    fn from(err: serde_json::Error) -> Self {
        EvonetError::Serialization(err.to_string())
    }
}

impl EvonetError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.to_string(),
            expected,
            actual,
        }
    }

    /// Create an error for a hyperparameter that must be strictly positive
    #[must_use]
    pub fn non_positive(param: &str, value: usize) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: "> 0".to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, EvonetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_activation_display() {
        let err = EvonetError::UnsupportedActivation {
            kind: "relu".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unsupported output-activation kind"));
        assert!(msg.contains("relu"));
    }

    #[test]
    fn test_dimension_mismatch_helper() {
        let err = EvonetError::dimension_mismatch("carry.hidden", 32, 16);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch in carry.hidden: expected 32, got 16"
        );
    }

    #[test]
    fn test_non_positive_helper() {
        let err = EvonetError::non_positive("num_hidden_units", 0);
        assert!(matches!(
            err,
            EvonetError::InvalidHyperparameter { ref param, .. } if param == "num_hidden_units"
        ));
        assert!(err.to_string().contains("> 0"));
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: EvonetError = json_err.into();
        assert!(matches!(err, EvonetError::Serialization(_)));
    }
}
