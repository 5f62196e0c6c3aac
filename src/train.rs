//! Training loop.
//!
//! [`fit`] drives any [`Model`] with plain gradient descent, either over the whole
//! dataset per iteration or over ordered minibatches. There is no early stopping: the
//! loop always runs `epochs` passes. Each step's loss is the loss of its forward pass,
//! taken before that step's update, and is logged at `info` level.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::metrics;
use crate::model::labels_from_output;
use crate::{Dataset, Error, Model, Result};

/// How each epoch is split into gradient steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// One step per epoch over every example.
    #[default]
    Full,
    /// Contiguous batches of `size` examples, the last one possibly shorter.
    Mini { size: usize },
}

/// Row order used when partitioning minibatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Dataset order, identical every epoch.
    #[default]
    None,
    /// A fresh permutation per epoch from a seeded RNG.
    Seeded(u64),
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    /// Passes over the data (iterations in full-batch mode).
    pub epochs: usize,
    pub lr: f64,
    pub batch: BatchMode,
    /// Ignored in full-batch mode.
    pub shuffle: Shuffle,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            lr: 1e-2,
            batch: BatchMode::Full,
            shuffle: Shuffle::None,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lr must be finite and > 0, got {}",
                self.lr
            )));
        }
        if let BatchMode::Mini { size: 0 } = self.batch {
            return Err(Error::InvalidConfig("batch size must be > 0".to_owned()));
        }
        Ok(())
    }
}

/// Loss of a single gradient step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub epoch: usize,
    /// Always 0 in full-batch mode.
    pub batch: usize,
    pub loss: f64,
}

#[derive(Debug, Clone)]
pub struct FitReport {
    /// One entry per gradient step, in execution order.
    pub steps: Vec<StepReport>,
    /// Loss reported by the last step.
    pub final_loss: f64,
}

impl FitReport {
    /// Mean step loss of each epoch.
    pub fn epoch_losses(&self) -> Vec<f64> {
        let mut out: Vec<(f64, usize)> = Vec::new();
        for step in &self.steps {
            if out.len() <= step.epoch {
                out.resize(step.epoch + 1, (0.0, 0));
            }
            out[step.epoch].0 += step.loss;
            out[step.epoch].1 += 1;
        }
        out.into_iter()
            .map(|(total, n)| total / n.max(1) as f64)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    pub loss: f64,
    /// Integer-truncated percentage of correctly classified rows.
    pub accuracy: u32,
}

/// Train `model` on `train` with gradient descent.
///
/// The model's weights must already be initialized; this only updates them.
pub fn fit<M: Model>(model: &mut M, train: &Dataset, cfg: &FitConfig) -> Result<FitReport> {
    cfg.validate()?;
    ensure_compatible(model, train)?;

    log::debug!(
        "fit: {} examples, {} features, {} outputs, {:?}, lr={}",
        train.len(),
        train.features(),
        train.target_dim(),
        cfg.batch,
        cfg.lr
    );

    let mut steps = Vec::new();
    match cfg.batch {
        BatchMode::Full => {
            for epoch in 0..cfg.epochs {
                let loss = train_step(model, train, cfg.lr)?;
                log::info!("iteration {epoch} loss: {loss}");
                steps.push(StepReport {
                    epoch,
                    batch: 0,
                    loss,
                });
            }
        }
        BatchMode::Mini { size } => {
            let mut rng = match cfg.shuffle {
                Shuffle::None => None,
                Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
            };
            let mut order: Vec<usize> = (0..train.len()).collect();

            for epoch in 0..cfg.epochs {
                let batches = match rng.as_mut() {
                    None => train.batches(size)?,
                    Some(rng) => {
                        order.shuffle(rng);
                        train.select(&order)?.batches(size)?
                    }
                };

                for (batch_idx, batch) in batches.iter().enumerate() {
                    let loss = train_step(model, batch, cfg.lr)?;
                    log::info!("epoch {epoch} batch {batch_idx} loss: {loss}");
                    steps.push(StepReport {
                        epoch,
                        batch: batch_idx,
                        loss,
                    });
                }
            }
        }
    }

    let final_loss = steps.last().map(|s| s.loss).unwrap_or(f64::NAN);
    Ok(FitReport { steps, final_loss })
}

/// One forward/backward/update over `batch`; returns the pre-update loss.
pub fn train_step<M: Model>(model: &mut M, batch: &Dataset, lr: f64) -> Result<f64> {
    let step = model.compute_step(batch)?;
    model.apply_gradients(&step.gradients, lr)?;
    Ok(step.loss)
}

/// Loss and classification accuracy of `model` on `data`.
///
/// Labels are taken from `data.y()`: a single column is used as-is (rounded), one-hot
/// rows are decoded with argmax.
pub fn evaluate<M: Model>(model: &M, data: &Dataset) -> Result<EvalReport> {
    ensure_compatible(model, data)?;

    let y_hat = model.predict(data.x())?;
    let loss = model.loss(data)?;
    let accuracy = metrics::accuracy(&labels_from_output(data.y()), &labels_from_output(&y_hat))?;
    log::info!("evaluate: loss={loss} accuracy={accuracy}%");
    Ok(EvalReport { loss, accuracy })
}

fn ensure_compatible<M: Model>(model: &M, data: &Dataset) -> Result<()> {
    if data.features() != model.input_dim() {
        return Err(Error::InvalidData(format!(
            "dataset has {} features but the model expects {}",
            data.features(),
            model.input_dim()
        )));
    }
    if data.target_dim() != model.output_dim() {
        return Err(Error::InvalidData(format!(
            "dataset target_dim {} does not match model output_dim {}",
            data.target_dim(),
            model.output_dim()
        )));
    }
    Ok(())
}
