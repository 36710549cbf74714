//! Long Short-Term Memory cell.
//!
//! A single recurrent step. The caller owns the [`LstmCarry`] and threads
//! it through successive calls to [`LstmCell::step`].

use rand::Rng;

use super::functional::{sigmoid, tanh};
use super::linear::Dense;
use super::module::Module;
use crate::error::{EvonetError, Result};
use crate::tensor::Tensor;

/// Recurrent state of an LSTM: the `(cell, hidden)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmCarry {
    /// Cell state `c`
    pub cell: Tensor,
    /// Output (hidden) state `h`
    pub hidden: Tensor,
}

impl LstmCarry {
    /// Zeroed carry of shape `[hidden_size]`.
    #[must_use]
    pub fn zeros(hidden_size: usize) -> Self {
        Self {
            cell: Tensor::zeros(&[hidden_size]),
            hidden: Tensor::zeros(&[hidden_size]),
        }
    }

    /// Zeroed carry of shape `[batch, hidden_size]`.
    #[must_use]
    pub fn zeros_batched(batch: usize, hidden_size: usize) -> Self {
        Self {
            cell: Tensor::zeros(&[batch, hidden_size]),
            hidden: Tensor::zeros(&[batch, hidden_size]),
        }
    }

    /// Width of the hidden state.
    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.hidden.last_dim()
    }
}

/// LSTM cell with forget, input, output gates and cell state.
///
/// ```text
/// i_t = σ(W_ii @ x_t + W_hi @ h_{t-1} + b_i)  // input gate
/// f_t = σ(W_if @ x_t + W_hf @ h_{t-1} + b_f)  // forget gate
/// g_t = tanh(W_ig @ x_t + W_hg @ h_{t-1} + b_g)  // candidate cell
/// o_t = σ(W_io @ x_t + W_ho @ h_{t-1} + b_o)  // output gate
/// c_t = f_t * c_{t-1} + i_t * g_t  // cell state
/// h_t = o_t * tanh(c_t)  // hidden state
/// ```
///
/// Input kernels are LeCun-normal and carry no bias; recurrent kernels
/// are orthogonal and carry the gate bias.
///
/// # Reference
///
/// Hochreiter, S., & Schmidhuber, J. (1997). Long Short-Term Memory. Neural Computation.
#[derive(Clone)]
pub struct LstmCell {
    input_size: usize,
    hidden_size: usize,
    // Gates: input, forget, cell, output
    w_ii: Dense,
    w_hi: Dense,
    w_if: Dense,
    w_hf: Dense,
    w_ig: Dense,
    w_hg: Dense,
    w_io: Dense,
    w_ho: Dense,
}

impl LstmCell {
    /// Create a cell drawing all weights from `rng`.
    pub fn new<R: Rng + ?Sized>(input_size: usize, hidden_size: usize, rng: &mut R) -> Self {
        let gate = |rng: &mut R| {
            let input = Dense::without_bias(input_size, hidden_size, rng);
            let hidden = Dense::orthogonal(hidden_size, rng);
            (input, hidden)
        };

        let (w_ii, w_hi) = gate(&mut *rng);
        let (w_if, w_hf) = gate(&mut *rng);
        let (w_ig, w_hg) = gate(&mut *rng);
        let (w_io, w_ho) = gate(&mut *rng);

        Self {
            input_size,
            hidden_size,
            w_ii,
            w_hi,
            w_if,
            w_hf,
            w_ig,
            w_hg,
            w_io,
            w_ho,
        }
    }

    /// Zeroed carry matching this cell.
    #[must_use]
    pub fn initialize_carry(&self) -> LstmCarry {
        LstmCarry::zeros(self.hidden_size)
    }

    /// Zeroed batched carry matching this cell.
    #[must_use]
    pub fn initialize_carry_batched(&self, batch: usize) -> LstmCarry {
        LstmCarry::zeros_batched(batch, self.hidden_size)
    }

    /// One recurrent step: returns the new carry and the cell output `h_t`.
    pub fn step(&self, carry: &LstmCarry, x: &Tensor) -> Result<(LstmCarry, Tensor)> {
        self.check_step_shapes(carry, x)?;
        let (c, h) = (&carry.cell, &carry.hidden);

        let gate = |w_x: &Dense, w_h: &Dense| -> Result<Tensor> {
            let from_input = w_x.forward(x)?;
            let from_hidden = w_h.forward(h)?;
            // [1, in] input against an unbatched carry
            Tensor::try_new(from_input.into_data(), from_hidden.shape())?.add(&from_hidden)
        };

        let i = sigmoid(&gate(&self.w_ii, &self.w_hi)?);
        let f = sigmoid(&gate(&self.w_if, &self.w_hf)?);
        let g = tanh(&gate(&self.w_ig, &self.w_hg)?);
        let o = sigmoid(&gate(&self.w_io, &self.w_ho)?);

        // c_t = f * c_{t-1} + i * g
        let c_new = f.mul(c)?.add(&i.mul(&g)?)?;
        // h_t = o * tanh(c_t)
        let h_new = o.mul(&tanh(&c_new))?;

        let output = h_new.clone();
        Ok((
            LstmCarry {
                cell: c_new,
                hidden: h_new,
            },
            output,
        ))
    }

    fn check_step_shapes(&self, carry: &LstmCarry, x: &Tensor) -> Result<()> {
        if x.last_dim() != self.input_size {
            return Err(EvonetError::dimension_mismatch(
                "lstm input",
                self.input_size,
                x.last_dim(),
            ));
        }
        if carry.hidden.last_dim() != self.hidden_size {
            return Err(EvonetError::dimension_mismatch(
                "carry.hidden",
                self.hidden_size,
                carry.hidden.last_dim(),
            ));
        }
        if carry.cell.shape() != carry.hidden.shape() {
            return Err(EvonetError::dimension_mismatch(
                "carry.cell",
                carry.hidden.numel(),
                carry.cell.numel(),
            ));
        }
        if x.rows() != carry.hidden.rows() {
            return Err(EvonetError::dimension_mismatch(
                "lstm batch",
                carry.hidden.rows(),
                x.rows(),
            ));
        }
        Ok(())
    }

    /// Input feature width.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Hidden state width.
    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn layers(&self) -> [&Dense; 8] {
        [
            &self.w_ii, &self.w_hi, &self.w_if, &self.w_hf, &self.w_ig, &self.w_hg, &self.w_io,
            &self.w_ho,
        ]
    }
}

impl Module for LstmCell {
    fn parameters(&self) -> Vec<&Tensor> {
        self.layers()
            .into_iter()
            .flat_map(|layer| layer.parameters())
            .collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut p = self.w_ii.parameters_mut();
        p.extend(self.w_hi.parameters_mut());
        p.extend(self.w_if.parameters_mut());
        p.extend(self.w_hf.parameters_mut());
        p.extend(self.w_ig.parameters_mut());
        p.extend(self.w_hg.parameters_mut());
        p.extend(self.w_io.parameters_mut());
        p.extend(self.w_ho.parameters_mut());
        p
    }
}

impl std::fmt::Debug for LstmCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LstmCell")
            .field("input_size", &self.input_size)
            .field("hidden_size", &self.hidden_size)
            .finish_non_exhaustive()
    }
}
