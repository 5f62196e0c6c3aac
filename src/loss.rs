//! Loss functions.
//!
//! Both losses take the targets `y` and the predicted probabilities `y_hat` (same shape)
//! and average over examples (rows), not over cells.
//!
//! Predictions are clamped into `[PROB_EPS, 1 - PROB_EPS]` before taking logs, so a
//! saturated sigmoid or softmax gives a large finite loss instead of `inf`. NaN
//! predictions are not clamped and surface as [`crate::Error::Domain`].

use crate::{Error, Matrix, Result};

/// Smallest probability passed to `ln`.
pub const PROB_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported loss functions.
pub enum Loss {
    /// Binary cross-entropy of sigmoid outputs (one independent probability per cell).
    BinaryCrossEntropy,
    /// Categorical cross-entropy of softmax rows against one-hot targets.
    CategoricalCrossEntropy,
}

impl Loss {
    /// Compute the mean loss over the rows of `y`.
    ///
    /// Shape contract: `y.shape() == y_hat.shape()`.
    pub fn forward(self, y: &Matrix, y_hat: &Matrix) -> Result<f64> {
        match self {
            Loss::BinaryCrossEntropy => binary_cross_entropy(y, y_hat),
            Loss::CategoricalCrossEntropy => categorical_cross_entropy(y, y_hat),
        }
    }
}

/// `-(1/N) Σ (y ⊙ ln ŷ + (1 - y) ⊙ ln(1 - ŷ))`, N = rows.
pub fn binary_cross_entropy(y: &Matrix, y_hat: &Matrix) -> Result<f64> {
    ensure_same_shape(y, y_hat)?;

    let y_hat = clamp_probabilities(y_hat);
    let pos = y.hadamard(&y_hat.ln()?)?;
    let neg = y.one_minus().hadamard(&y_hat.one_minus().ln()?)?;
    Ok(-pos.add(&neg)?.sum() / y.rows() as f64)
}

/// `-(1/N) Σ_rows Σ_classes y ⊙ ln ŷ`, N = rows.
pub fn categorical_cross_entropy(y: &Matrix, y_hat: &Matrix) -> Result<f64> {
    ensure_same_shape(y, y_hat)?;

    let y_hat = clamp_probabilities(y_hat);
    Ok(-y.hadamard(&y_hat.ln()?)?.sum() / y.rows() as f64)
}

fn ensure_same_shape(y: &Matrix, y_hat: &Matrix) -> Result<()> {
    if y.shape() != y_hat.shape() {
        return Err(Error::ShapeMismatch(format!(
            "targets are {}x{} but predictions are {}x{}",
            y.rows(),
            y.cols(),
            y_hat.rows(),
            y_hat.cols()
        )));
    }
    Ok(())
}

#[inline]
fn clamp_probabilities(y_hat: &Matrix) -> Matrix {
    y_hat.map(|p| p.clamp(PROB_EPS, 1.0 - PROB_EPS))
}
