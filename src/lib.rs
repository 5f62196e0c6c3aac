//! From-scratch MNIST classifiers on a dense matrix.
//!
//! `mnist-nn` implements two small feed-forward classifiers trained by plain gradient
//! descent, on top of a row-major `f64` [`Matrix`]:
//!
//! - [`LogisticRegression`]: `Ŷ = sigmoid(X·W)`, binary cross-entropy.
//! - [`TwoLayerNet`]: sigmoid hidden layer + softmax output, categorical cross-entropy.
//!
//! # Design goals
//!
//! - Value semantics: matrix operations return new matrices and never alias their inputs.
//! - Clear contracts: shapes are checked at every operation and mismatches are errors,
//!   never broadcast.
//! - Reproducibility: every source of randomness takes an explicit seed or RNG.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - X is `(examples, features)` with a leading bias column of 1.0.
//! - Y is either a single label column or one-hot rows `(examples, classes)`.
//! - Weights map features to outputs: `W` is `(features, classes)`,
//!   `W1` is `(features, hidden)`, `W2` is `(hidden, classes)`.
//!
//! # Quick start
//!
//! ```rust
//! use mnist_nn::{fit, evaluate, Dataset, FitConfig, LogisticRegression, Matrix};
//!
//! # fn main() -> mnist_nn::Result<()> {
//! let x = Matrix::from_rows(&[
//!     vec![1.0, -2.0, -1.5],
//!     vec![1.0, -1.8, -2.2],
//!     vec![1.0, 2.1, 1.9],
//!     vec![1.0, 1.7, 2.4],
//! ])?;
//! let y = Matrix::from_rows(&[vec![0.0], vec![0.0], vec![1.0], vec![1.0]])?;
//! let train = Dataset::new(x, y)?;
//!
//! let mut model = LogisticRegression::new(3, 1)?;
//! fit(
//!     &mut model,
//!     &train,
//!     &FitConfig {
//!         epochs: 50,
//!         lr: 0.1,
//!         ..FitConfig::default()
//!     },
//! )?;
//!
//! let report = evaluate(&model, &train)?;
//! assert_eq!(report.accuracy, 100);
//! # Ok(())
//! # }
//! ```
//!
//! # Minibatches
//!
//! ```rust
//! use mnist_nn::{fit, BatchMode, Dataset, FitConfig, Matrix, Shuffle, TwoLayerNet};
//!
//! # fn main() -> mnist_nn::Result<()> {
//! let x = Matrix::from_rows(&[
//!     vec![1.0, 0.0, 1.0],
//!     vec![1.0, 1.0, 0.0],
//!     vec![1.0, 0.5, 0.5],
//! ])?;
//! let labels = Matrix::from_rows(&[vec![0.0], vec![1.0], vec![2.0]])?;
//! let train = Dataset::new(x, mnist_nn::one_hot(&labels, 3)?)?;
//!
//! let mut net = TwoLayerNet::new_with_seed(3, 4, 3, 0)?;
//! let report = fit(
//!     &mut net,
//!     &train,
//!     &FitConfig {
//!         epochs: 5,
//!         lr: 0.1,
//!         batch: BatchMode::Mini { size: 2 },
//!         shuffle: Shuffle::None,
//!     },
//! )?;
//! assert_eq!(report.steps.len(), 10);
//! # Ok(())
//! # }
//! ```

pub(crate) mod activation;
pub mod data;
pub mod error;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub mod mnist;
pub mod model;
pub mod train;

pub use data::{create_batches, one_hot, Dataset};
pub use error::{Error, Result};
pub use loss::Loss;
pub use matrix::Matrix;
pub use metrics::accuracy;
pub use model::{Forward, LogisticRegression, Model, Step, TwoLayerGradients, TwoLayerNet};
pub use train::{evaluate, fit, train_step};
pub use train::{BatchMode, EvalReport, FitConfig, FitReport, Shuffle, StepReport};
