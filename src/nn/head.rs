//! Output heads.
//!
//! The last transform between the LSTM cell output and the network
//! output. The head kind is fixed at construction; only the stochastic
//! heads draw from the random stream.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::functional::{gumbel, standard_normal, tanh};
use super::linear::Dense;
use super::module::Module;
use crate::error::{EvonetError, Result};
use crate::tensor::Tensor;

/// Output-activation selector.
///
/// Parsed from `"identity"`, `"tanh"`, `"categorical"` or `"gaussian"`.
/// Any other name is rejected with
/// [`EvonetError::UnsupportedActivation`].
///
/// ```
/// use evonet::nn::OutputActivation;
///
/// let act: OutputActivation = "tanh".parse().unwrap();
/// assert_eq!(act, OutputActivation::Tanh);
/// assert!("softmax".parse::<OutputActivation>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutputActivation {
    /// Raw dense projection.
    #[default]
    Identity,
    /// Dense projection squashed into `[-1, 1]`.
    Tanh,
    /// One-hot sample from a softmax over dense logits.
    Categorical,
    /// Dense mean plus noise scaled by a learned log-variance.
    Gaussian,
}

impl OutputActivation {
    /// All supported heads.
    pub const ALL: [OutputActivation; 4] = [
        OutputActivation::Identity,
        OutputActivation::Tanh,
        OutputActivation::Categorical,
        OutputActivation::Gaussian,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OutputActivation::Identity => "identity",
            OutputActivation::Tanh => "tanh",
            OutputActivation::Categorical => "categorical",
            OutputActivation::Gaussian => "gaussian",
        }
    }

    /// Whether the head draws from the random stream.
    #[must_use]
    pub fn is_stochastic(self) -> bool {
        matches!(
            self,
            OutputActivation::Categorical | OutputActivation::Gaussian
        )
    }
}

impl fmt::Display for OutputActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputActivation {
    type Err = EvonetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identity" => Ok(OutputActivation::Identity),
            "tanh" => Ok(OutputActivation::Tanh),
            "categorical" => Ok(OutputActivation::Categorical),
            "gaussian" => Ok(OutputActivation::Gaussian),
            other => {
                warn!(kind = other, "rejecting unsupported output activation");
                Err(EvonetError::UnsupportedActivation {
                    kind: other.to_string(),
                })
            }
        }
    }
}

impl TryFrom<String> for OutputActivation {
    type Error = EvonetError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<OutputActivation> for String {
    fn from(value: OutputActivation) -> Self {
        value.as_str().to_string()
    }
}

/// Output head: a dense projection followed by the selected activation.
#[derive(Debug, Clone)]
pub struct OutputHead {
    /// Projection to `num_output_units` (mean or logits)
    projection: Dense,
    kind: HeadKind,
}

/// Per-activation state. Only the gaussian head owns extra parameters.
#[derive(Debug, Clone)]
enum HeadKind {
    Identity,
    Tanh,
    Categorical,
    /// Projection to a single log-variance per row
    Gaussian { log_var: Dense },
}

impl OutputHead {
    /// Build a head mapping `in_features` to `out_features`.
    pub fn new<R: Rng + ?Sized>(
        activation: OutputActivation,
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Self {
        let projection = Dense::new(in_features, out_features, rng);
        let kind = match activation {
            OutputActivation::Identity => HeadKind::Identity,
            OutputActivation::Tanh => HeadKind::Tanh,
            OutputActivation::Categorical => HeadKind::Categorical,
            OutputActivation::Gaussian => HeadKind::Gaussian {
                log_var: Dense::new(in_features, 1, rng),
            },
        };
        Self { projection, kind }
    }

    /// The selected activation.
    #[must_use]
    pub fn activation(&self) -> OutputActivation {
        match self.kind {
            HeadKind::Identity => OutputActivation::Identity,
            HeadKind::Tanh => OutputActivation::Tanh,
            HeadKind::Categorical => OutputActivation::Categorical,
            HeadKind::Gaussian { .. } => OutputActivation::Gaussian,
        }
    }

    /// Output width.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.projection.out_features()
    }

    /// Apply the head to `(*, in_features)`, producing `(*, out_features)`.
    ///
    /// `rng` is only read when [`OutputActivation::is_stochastic`] holds for
    /// the head's activation.
    pub fn apply<R: Rng + ?Sized>(&self, x: &Tensor, rng: &mut R) -> Result<Tensor> {
        let projected = self.projection.forward(x)?;
        match &self.kind {
            HeadKind::Identity => Ok(projected),
            HeadKind::Tanh => Ok(tanh(&projected)),
            HeadKind::Categorical => {
                let indices = gumbel_max(&projected, rng);
                one_hot(&indices, projected.shape())
            }
            HeadKind::Gaussian { log_var } => {
                let log_var = log_var.forward(x)?;
                Ok(gaussian(projected, &log_var, rng))
            }
        }
    }

    /// Sample one index per row from a categorical over the head's logits.
    ///
    /// Consumes the random stream exactly as the categorical head does, so
    /// for the same seed the result is the hot index of [`OutputHead::apply`].
    pub fn sample_indices<R: Rng + ?Sized>(&self, x: &Tensor, rng: &mut R) -> Result<Vec<usize>> {
        let logits = self.projection.forward(x)?;
        Ok(gumbel_max(&logits, rng))
    }
}

/// `mean + exp(log_var / 2) * N(0, 1)`, one log-variance per row.
fn gaussian<R: Rng + ?Sized>(mean: Tensor, log_var: &Tensor, rng: &mut R) -> Tensor {
    let width = mean.last_dim();
    let mut out = mean;
    for (row, &lv) in out.data_mut().chunks_mut(width.max(1)).zip(log_var.data()) {
        let std = (0.5 * lv).exp();
        for v in row {
            *v += std * standard_normal(rng);
        }
    }
    out
}

/// Gumbel-max trick: argmax(logits + g), g ~ Gumbel(0, 1), per row.
fn gumbel_max<R: Rng + ?Sized>(logits: &Tensor, rng: &mut R) -> Vec<usize> {
    let mut perturbed = logits.clone();
    for v in perturbed.data_mut() {
        *v += gumbel(rng);
    }
    perturbed.argmax_rows()
}

fn one_hot(indices: &[usize], shape: &[usize]) -> Result<Tensor> {
    let width = shape.last().copied().unwrap_or(1);
    let mut data = vec![0.0; indices.len() * width];
    for (row, &idx) in indices.iter().enumerate() {
        data[row * width + idx] = 1.0;
    }
    Tensor::try_new(data, shape)
}

impl Module for OutputHead {
    fn parameters(&self) -> Vec<&Tensor> {
        let mut p = self.projection.parameters();
        if let HeadKind::Gaussian { log_var } = &self.kind {
            p.extend(log_var.parameters());
        }
        p
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p = self.projection.parameters_mut();
        if let HeadKind::Gaussian { log_var } = &mut self.kind {
            p.extend(log_var.parameters_mut());
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::functional::softmax;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn head(activation: OutputActivation) -> OutputHead {
        OutputHead::new(activation, 6, 4, &mut StdRng::seed_from_u64(0))
    }

    fn input() -> Tensor {
        Tensor::from_slice(&[0.1, -0.2, 0.3, -0.4, 0.5, -0.6])
    }

    #[test]
    fn test_parse_all_names() {
        for act in OutputActivation::ALL {
            assert_eq!(act.as_str().parse::<OutputActivation>().unwrap(), act);
            assert_eq!(act.to_string(), act.as_str());
        }
    }

    #[test]
    fn test_parse_unsupported() {
        let err = "relu".parse::<OutputActivation>().unwrap_err();
        assert!(matches!(
            err,
            EvonetError::UnsupportedActivation { ref kind } if kind == "relu"
        ));
        // Names are matched exactly
        assert!("Tanh".parse::<OutputActivation>().is_err());
        assert!("".parse::<OutputActivation>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&OutputActivation::Gaussian).unwrap();
        assert_eq!(json, "\"gaussian\"");
        let act: OutputActivation = serde_json::from_str("\"categorical\"").unwrap();
        assert_eq!(act, OutputActivation::Categorical);
        assert!(serde_json::from_str::<OutputActivation>("\"swish\"").is_err());
    }

    #[test]
    fn test_output_shapes() {
        for act in OutputActivation::ALL {
            let out = head(act)
                .apply(&input(), &mut StdRng::seed_from_u64(1))
                .unwrap();
            assert_eq!(out.shape(), &[4], "{act}");
        }
    }

    #[test]
    fn test_tanh_bounded() {
        let x = input().map(|v| v * 1000.0);
        let out = head(OutputActivation::Tanh)
            .apply(&x, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(out.data().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_identity_is_projection() {
        let h = head(OutputActivation::Identity);
        let out = h.apply(&input(), &mut StdRng::seed_from_u64(1)).unwrap();
        let projected = h.projection.forward(&input()).unwrap();
        assert_eq!(out, projected);
    }

    #[test]
    fn test_deterministic_heads_ignore_rng() {
        let deterministic = OutputActivation::ALL.into_iter().filter(|a| !a.is_stochastic());
        for act in deterministic {
            let h = head(act);
            let a = h.apply(&input(), &mut StdRng::seed_from_u64(1)).unwrap();
            let b = h.apply(&input(), &mut StdRng::seed_from_u64(999)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_categorical_one_hot() {
        let h = head(OutputActivation::Categorical);
        for seed in 0..20 {
            let out = h.apply(&input(), &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(out.data().iter().filter(|&&v| v == 1.0).count(), 1);
            assert_eq!(out.data().iter().filter(|&&v| v == 0.0).count(), 3);
        }
    }

    #[test]
    fn test_categorical_matches_sample_indices() {
        let h = head(OutputActivation::Categorical);
        let out = h.apply(&input(), &mut StdRng::seed_from_u64(5)).unwrap();
        let idx = h
            .sample_indices(&input(), &mut StdRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(out.argmax_rows(), idx);
    }

    #[test]
    fn test_categorical_follows_logits() {
        // A dominant logit should be sampled almost always
        let mut h = head(OutputActivation::Categorical);
        h.projection.set_weight(Tensor::zeros(&[4, 6])).unwrap();
        h.projection
            .set_bias(Tensor::from_slice(&[0.0, 10.0, 0.0, 0.0]))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let hits = (0..200)
            .filter(|_| h.sample_indices(&input(), &mut rng).unwrap() == vec![1])
            .count();
        assert!(hits > 190, "dominant class sampled {hits}/200 times");
    }

    #[test]
    fn test_categorical_frequencies_match_softmax() {
        let logits = [0.1, 0.4, 0.0, 0.2];
        let mut h = head(OutputActivation::Categorical);
        h.projection.set_weight(Tensor::zeros(&[4, 6])).unwrap();
        h.projection.set_bias(Tensor::from_slice(&logits)).unwrap();

        let draws = 50_000;
        let mut counts = [0usize; 4];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..draws {
            counts[h.sample_indices(&input(), &mut rng).unwrap()[0]] += 1;
        }

        let expected = softmax(&Tensor::from_slice(&logits));
        for (count, p) in counts.iter().zip(expected.data()) {
            let freq = *count as f32 / draws as f32;
            assert!((freq - p).abs() < 0.01, "frequency {freq} vs probability {p}");
        }
    }

    #[test]
    fn test_gaussian_has_log_variance() {
        let h = head(OutputActivation::Gaussian);
        assert_eq!(h.activation(), OutputActivation::Gaussian);
        match &h.kind {
            HeadKind::Gaussian { log_var } => {
                assert_eq!(log_var.in_features(), 6);
                assert_eq!(log_var.out_features(), 1);
            }
            other => panic!("expected gaussian kind, got {other:?}"),
        }
        for act in OutputActivation::ALL {
            assert_eq!(head(act).activation(), act);
        }
    }

    #[test]
    fn test_stochastic_heads_vary_with_rng() {
        let stochastic: Vec<_> = OutputActivation::ALL
            .into_iter()
            .filter(|a| a.is_stochastic())
            .collect();
        assert_eq!(
            stochastic,
            [OutputActivation::Categorical, OutputActivation::Gaussian]
        );
        for act in stochastic {
            let h = head(act);
            let outputs: Vec<Tensor> = (0..10)
                .map(|seed| h.apply(&input(), &mut StdRng::seed_from_u64(seed)).unwrap())
                .collect();
            assert!(
                outputs.iter().any(|o| *o != outputs[0]),
                "{act} head ignored the random stream"
            );
        }
    }

    #[test]
    fn test_gaussian_zero_variance_is_mean() {
        // log_var -> -inf makes the noise vanish
        let mut h = head(OutputActivation::Gaussian);
        if let HeadKind::Gaussian { log_var } = &mut h.kind {
            log_var.set_weight(Tensor::zeros(&[1, 6])).unwrap();
            log_var.set_bias(Tensor::from_slice(&[-200.0])).unwrap();
        }
        let out = h.apply(&input(), &mut StdRng::seed_from_u64(2)).unwrap();
        let mean = h.projection.forward(&input()).unwrap();
        for (a, b) in out.data().iter().zip(mean.data()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_batched_head() {
        let h = head(OutputActivation::Gaussian);
        let x = Tensor::zeros(&[3, 6]);
        let out = h.apply(&x, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(out.shape(), &[3, 4]);

        let c = head(OutputActivation::Categorical)
            .apply(&x, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(c.data().iter().sum::<f32>(), 3.0);
    }

    #[test]
    fn test_parameter_layout() {
        assert_eq!(head(OutputActivation::Identity).num_parameters(), 6 * 4 + 4);
        // Gaussian adds a [1, 6] kernel and a [1] bias
        assert_eq!(
            head(OutputActivation::Gaussian).num_parameters(),
            6 * 4 + 4 + 6 + 1
        );
        assert_eq!(head(OutputActivation::Gaussian).parameters().len(), 4);
    }
}
