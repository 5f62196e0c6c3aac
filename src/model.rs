//! The two classifier architectures and the `Model` trait the training loop drives.
//!
//! - [`LogisticRegression`]: `Ŷ = sigmoid(X·W)`, binary cross-entropy.
//! - [`TwoLayerNet`]: `H = sigmoid(X·W1)`, `Ŷ = softmax(H·W2)`, categorical cross-entropy.
//!
//! Both use closed-form gradients. The output-layer error term `Ŷ - Y` is only the
//! gradient w.r.t. the logits because each output activation is paired with its matching
//! cross-entropy loss; swapping either side requires re-deriving the backward pass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::activation::sigmoid_grad_from_output;
use crate::{Dataset, Error, Loss, Matrix, Result};

/// Loss of a batch together with the gradients that produced it.
#[derive(Debug, Clone)]
pub struct Step<G> {
    /// Loss of the forward pass, before any update.
    pub loss: f64,
    pub gradients: G,
}

/// A classifier trainable by [`crate::fit`].
///
/// `compute_step` must not mutate the model; `apply_gradients` is the only update.
pub trait Model {
    type Gradients;

    /// Number of input features (including the bias column).
    fn input_dim(&self) -> usize;

    /// Number of output columns.
    fn output_dim(&self) -> usize;

    /// Predicted probabilities, shape `(x.rows(), output_dim)`.
    fn predict(&self, x: &Matrix) -> Result<Matrix>;

    /// Mean loss over `data`.
    fn loss(&self, data: &Dataset) -> Result<f64>;

    /// Forward + backward pass over one batch.
    fn compute_step(&self, batch: &Dataset) -> Result<Step<Self::Gradients>>;

    /// Gradient-descent update: `W ← W - lr · grad` for every weight matrix.
    fn apply_gradients(&mut self, grads: &Self::Gradients, lr: f64) -> Result<()>;

    /// Predicted labels as a single column.
    ///
    /// Single-output models round the probability; multi-output models take the argmax.
    fn classify(&self, x: &Matrix) -> Result<Matrix> {
        Ok(labels_from_output(&self.predict(x)?))
    }
}

/// Turn predicted probabilities into a single column of labels.
///
/// - one column: round to the nearest integer (threshold at 0.5)
/// - several columns: index of the first maximum per row
pub fn labels_from_output(y_hat: &Matrix) -> Matrix {
    if y_hat.cols() == 1 {
        y_hat.round()
    } else {
        y_hat.argmax_rows()
    }
}

/// Single-layer logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    /// Shape `(features, classes)`.
    w: Matrix,
}

impl LogisticRegression {
    /// Zero-initialized weights of shape `(features, classes)`.
    pub fn new(features: usize, classes: usize) -> Result<Self> {
        Ok(Self {
            w: Matrix::zeros(features, classes)?,
        })
    }

    pub fn from_weights(w: Matrix) -> Self {
        Self { w }
    }

    #[inline]
    pub fn weights(&self) -> &Matrix {
        &self.w
    }

    pub fn into_weights(self) -> Matrix {
        self.w
    }

    /// `sigmoid(X·W)`.
    pub fn forward(&self, x: &Matrix) -> Result<Matrix> {
        Ok(x.matmul(&self.w)?.sigmoid())
    }

    /// Binary cross-entropy of `forward(x)` against `y`.
    pub fn loss(&self, x: &Matrix, y: &Matrix) -> Result<f64> {
        Loss::BinaryCrossEntropy.forward(y, &self.forward(x)?)
    }

    /// `(1/N) · Xᵗ · (Ŷ - Y)`, N = rows of `x`.
    pub fn gradient(&self, x: &Matrix, y: &Matrix) -> Result<Matrix> {
        let y_hat = self.forward(x)?;
        gradient_from_output(x, y, &y_hat)
    }
}

fn gradient_from_output(x: &Matrix, y: &Matrix, y_hat: &Matrix) -> Result<Matrix> {
    let n = x.rows() as f64;
    Ok(x.t_matmul(&y_hat.sub(y)?)?.scale(1.0 / n))
}

impl Model for LogisticRegression {
    type Gradients = Matrix;

    fn input_dim(&self) -> usize {
        self.w.rows()
    }

    fn output_dim(&self) -> usize {
        self.w.cols()
    }

    fn predict(&self, x: &Matrix) -> Result<Matrix> {
        self.forward(x)
    }

    fn loss(&self, data: &Dataset) -> Result<f64> {
        LogisticRegression::loss(self, data.x(), data.y())
    }

    fn compute_step(&self, batch: &Dataset) -> Result<Step<Matrix>> {
        let y_hat = self.forward(batch.x())?;
        let loss = Loss::BinaryCrossEntropy.forward(batch.y(), &y_hat)?;
        let gradients = gradient_from_output(batch.x(), batch.y(), &y_hat)?;
        Ok(Step { loss, gradients })
    }

    fn apply_gradients(&mut self, grads: &Matrix, lr: f64) -> Result<()> {
        self.w = self.w.sub(&grads.scale(lr))?;
        Ok(())
    }
}

/// Output of [`TwoLayerNet::forward`].
///
/// The hidden activation is kept because the backward pass needs it.
#[derive(Debug, Clone)]
pub struct Forward {
    /// Softmax probabilities, shape `(rows, classes)`.
    pub output: Matrix,
    /// Sigmoid hidden activation, shape `(rows, hidden)`.
    pub hidden: Matrix,
}

/// Gradients of the categorical cross-entropy w.r.t. both weight matrices.
#[derive(Debug, Clone)]
pub struct TwoLayerGradients {
    pub w1: Matrix,
    pub w2: Matrix,
}

/// Sigmoid hidden layer followed by a softmax output layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoLayerNet {
    /// Shape `(features, hidden)`.
    w1: Matrix,
    /// Shape `(hidden, classes)`.
    w2: Matrix,
}

impl TwoLayerNet {
    /// Weights drawn uniformly from `[0, 1)` using a deterministic seed.
    pub fn new_with_seed(features: usize, hidden: usize, classes: usize, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(features, hidden, classes, &mut rng)
    }

    /// Weights drawn uniformly from `[0, 1)` using the provided RNG.
    ///
    /// Zero weights would make every hidden unit identical, so random initialization
    /// is the only constructor besides [`TwoLayerNet::from_weights`].
    pub fn new_with_rng<R: Rng + ?Sized>(
        features: usize,
        hidden: usize,
        classes: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut w1 = Matrix::zeros(features, hidden)?;
        let mut w2 = Matrix::zeros(hidden, classes)?;
        w1.fill_random(rng);
        w2.fill_random(rng);
        Ok(Self { w1, w2 })
    }

    pub fn from_weights(w1: Matrix, w2: Matrix) -> Result<Self> {
        if w1.cols() != w2.rows() {
            return Err(Error::ShapeMismatch(format!(
                "w1 has {} hidden columns but w2 has {} rows",
                w1.cols(),
                w2.rows()
            )));
        }
        Ok(Self { w1, w2 })
    }

    #[inline]
    pub fn w1(&self) -> &Matrix {
        &self.w1
    }

    #[inline]
    pub fn w2(&self) -> &Matrix {
        &self.w2
    }

    #[inline]
    pub fn hidden_dim(&self) -> usize {
        self.w1.cols()
    }

    /// `H = sigmoid(X·W1)`, `Ŷ = softmax(H·W2)`.
    pub fn forward(&self, x: &Matrix) -> Result<Forward> {
        let hidden = x.matmul(&self.w1)?.sigmoid();
        let output = hidden.matmul(&self.w2)?.softmax();
        Ok(Forward { output, hidden })
    }

    /// Categorical cross-entropy of `y_hat` against one-hot `y`.
    pub fn loss(y: &Matrix, y_hat: &Matrix) -> Result<f64> {
        Loss::CategoricalCrossEntropy.forward(y, y_hat)
    }

    /// Backpropagation for one batch, given the cached forward pass over `x`.
    ///
    /// - `w2 = (1/N) · Hᵗ · (Ŷ - Y)`
    /// - `w1 = (1/N) · Xᵗ · [((Ŷ - Y) · W2ᵗ) ⊙ H ⊙ (1 - H)]`
    pub fn backward(&self, x: &Matrix, y: &Matrix, fwd: &Forward) -> Result<TwoLayerGradients> {
        let inv_n = 1.0 / x.rows() as f64;

        let delta_out = fwd.output.sub(y)?;
        let w2 = fwd.hidden.t_matmul(&delta_out)?.scale(inv_n);

        let delta_hidden = delta_out
            .matmul_t(&self.w2)?
            .hadamard(&fwd.hidden.map(sigmoid_grad_from_output))?;
        let w1 = x.t_matmul(&delta_hidden)?.scale(inv_n);

        Ok(TwoLayerGradients { w1, w2 })
    }
}

impl Model for TwoLayerNet {
    type Gradients = TwoLayerGradients;

    fn input_dim(&self) -> usize {
        self.w1.rows()
    }

    fn output_dim(&self) -> usize {
        self.w2.cols()
    }

    fn predict(&self, x: &Matrix) -> Result<Matrix> {
        Ok(self.forward(x)?.output)
    }

    fn loss(&self, data: &Dataset) -> Result<f64> {
        TwoLayerNet::loss(data.y(), &self.predict(data.x())?)
    }

    fn compute_step(&self, batch: &Dataset) -> Result<Step<TwoLayerGradients>> {
        let fwd = self.forward(batch.x())?;
        let loss = TwoLayerNet::loss(batch.y(), &fwd.output)?;
        let gradients = self.backward(batch.x(), batch.y(), &fwd)?;
        Ok(Step { loss, gradients })
    }

    fn apply_gradients(&mut self, grads: &TwoLayerGradients, lr: f64) -> Result<()> {
        self.w1 = self.w1.sub(&grads.w1.scale(lr))?;
        self.w2 = self.w2.sub(&grads.w2.scale(lr))?;
        Ok(())
    }
}
