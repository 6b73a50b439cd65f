#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The training loop and hyperparameter sweep.
//!
//! A [`SweepConfig`] spans a cartesian grid of runs; each run trains a fresh
//! classifier and records per-epoch metrics. [`run_sweep`] returns the history
//! of the run with the best test accuracy.

pub mod dataset;

use crate::graph::schema::GraphVariant;
use crate::model::batch::GraphBatch;
use crate::model::error::Result;
use crate::model::hgt::{for_variant, Classifier, HgtConfig, StepStats};
use self::dataset::Dataset;
use itertools::iproduct;
use ordered_float::OrderedFloat;

/// The hyperparameter grid of a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Hidden widths to try.
    pub hidden: Vec<usize>,
    /// Learning rates to try.
    pub learning_rates: Vec<f32>,
    /// Layer counts to try.
    pub layers: Vec<usize>,
    /// Dropout probability, fixed across the grid.
    pub dropout: f32,
    /// Epochs per run.
    pub epochs: usize,
    /// Samples per batch.
    pub batch_size: usize,
    /// Attention heads, fixed across the grid.
    pub heads: usize,
    /// Seed shared by every run, so runs differ only in hyperparameters.
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            hidden: vec![128, 256],
            learning_rates: vec![0.001, 0.005, 0.1],
            layers: vec![4, 7],
            dropout: 0.3,
            epochs: 100,
            batch_size: 512,
            heads: 2,
            seed: 42,
        }
    }
}

/// One point of the sweep grid.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Hidden width.
    pub hidden: usize,
    /// Learning rate.
    pub lr: f32,
    /// Layer count.
    pub layers: usize,
    /// Dropout probability.
    pub dropout: f32,
    /// Attention heads.
    pub heads: usize,
    /// Epochs to train.
    pub epochs: usize,
    /// Model seed.
    pub seed: u64,
}

impl RunConfig {
    fn model_config(&self) -> HgtConfig {
        HgtConfig {
            hidden: self.hidden,
            layers: self.layers,
            heads: self.heads,
            dropout: self.dropout,
            seed: self.seed,
        }
    }
}

impl SweepConfig {
    /// Enumerates the grid in a fixed order.
    #[must_use]
    pub fn runs(&self) -> Vec<RunConfig> {
        iproduct!(&self.hidden, &self.learning_rates, &self.layers)
            .map(|(&hidden, &lr, &layers)| RunConfig {
                hidden,
                lr,
                layers,
                dropout: self.dropout,
                heads: self.heads,
                epochs: self.epochs,
                seed: self.seed,
            })
            .collect()
    }
}

/// Train and test metrics of one epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochMetrics {
    /// Zero-based epoch index.
    pub epoch: usize,
    /// Mean training loss over the epoch.
    pub train_loss: f32,
    /// Training accuracy over the epoch.
    pub train_accuracy: f32,
    /// Mean test loss.
    pub test_loss: f32,
    /// Test accuracy.
    pub test_accuracy: f32,
}

/// The metrics of one full run.
#[derive(Debug, Clone)]
pub struct TrainHistory {
    /// The hyperparameters of the run.
    pub run: RunConfig,
    /// Per-epoch metrics, in order.
    pub epochs: Vec<EpochMetrics>,
}

impl TrainHistory {
    /// Test accuracy of the last epoch, or zero for an empty history.
    #[must_use]
    pub fn final_test_accuracy(&self) -> f32 {
        self.epochs.last().map_or(0.0, |m| m.test_accuracy)
    }
}

/// Sample-weighted mean loss and accuracy over a sequence of batch stats.
fn aggregate(stats: &[StepStats]) -> (f32, f32) {
    let samples: usize = stats.iter().map(|s| s.samples).sum();
    if samples == 0 {
        return (0.0, 0.0);
    }
    let loss: f32 = stats.iter().map(|s| s.loss * s.samples as f32).sum();
    let correct: usize = stats.iter().map(|s| s.correct).sum();
    (loss / samples as f32, correct as f32 / samples as f32)
}

/// Trains a model for `run.epochs` epochs, evaluating after each.
///
/// # Errors
///
/// Propagates schema errors from the model; see
/// [`crate::model::error::ModelError`].
pub fn train_model(
    model: &mut dyn Classifier,
    train: &[GraphBatch],
    test: &[GraphBatch],
    run: &RunConfig,
) -> Result<TrainHistory> {
    let mut epochs = Vec::with_capacity(run.epochs);

    for epoch in 0..run.epochs {
        let train_stats: Vec<StepStats> = train
            .iter()
            .map(|batch| model.train_step(batch, run.lr))
            .collect::<Result<_>>()?;
        let test_stats: Vec<StepStats> = test
            .iter()
            .map(|batch| model.evaluate(batch))
            .collect::<Result<_>>()?;

        let (train_loss, train_accuracy) = aggregate(&train_stats);
        let (test_loss, test_accuracy) = aggregate(&test_stats);
        tracing::info!(
            epoch,
            train_loss,
            train_accuracy,
            test_loss,
            test_accuracy,
            "epoch complete"
        );
        epochs.push(EpochMetrics {
            epoch,
            train_loss,
            train_accuracy,
            test_loss,
            test_accuracy,
        });
    }

    Ok(TrainHistory {
        run: *run,
        epochs,
    })
}

/// Runs the whole grid and returns the history with the best test accuracy.
/// An empty grid returns `Ok(None)`.
///
/// # Errors
///
/// Propagates batching errors and schema errors from the first failing run.
pub fn run_sweep(
    config: &SweepConfig,
    variant: GraphVariant,
    train: &Dataset,
    test: &Dataset,
) -> Result<Option<TrainHistory>> {
    let train_batches = train.batches(config.batch_size)?;
    let test_batches = test.batches(config.batch_size)?;

    let mut best: Option<(OrderedFloat<f32>, TrainHistory)> = None;
    for run in config.runs() {
        tracing::info!(?run, "sweep run starting");
        let mut model = for_variant(variant, &run.model_config());
        let history = train_model(model.as_mut(), &train_batches, &test_batches, &run)?;
        let accuracy = OrderedFloat(history.final_test_accuracy());
        tracing::info!(accuracy = accuracy.0, "sweep run finished");

        if best.as_ref().is_none_or(|(b, _)| accuracy > *b) {
            best = Some((accuracy, history));
        }
    }
    Ok(best.map(|(_, history)| history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use crate::sat::cnf::{Cnf, Label};

    fn tiny_dataset(n: usize) -> Dataset {
        let graphs = (0..n)
            .map(|i| {
                let label = if i % 2 == 0 { Label::Sat } else { Label::Unsat };
                Cnf::new(vec![Clause::new([1, -2]), Clause::new([-1, 2])], label)
                    .unwrap()
                    .to_graph(GraphVariant::Refactored)
            })
            .collect();
        Dataset::from_graphs(graphs, GraphVariant::Refactored)
    }

    fn tiny_sweep() -> SweepConfig {
        SweepConfig {
            hidden: vec![8],
            learning_rates: vec![0.01],
            layers: vec![2],
            dropout: 0.0,
            epochs: 2,
            batch_size: 4,
            heads: 1,
            seed: 5,
        }
    }

    #[test]
    fn test_default_grid_cardinality() {
        // 2 widths x 3 learning rates x 2 depths.
        assert_eq!(SweepConfig::default().runs().len(), 12);
    }

    #[test]
    fn test_grid_order_is_fixed() {
        let runs = SweepConfig::default().runs();
        assert_eq!(runs[0].hidden, 128);
        assert!((runs[0].lr - 0.001).abs() < 1e-9);
        assert_eq!(runs[0].layers, 4);
        assert_eq!(runs[1].layers, 7);
    }

    #[test]
    fn test_train_model_records_every_epoch() {
        let train = tiny_dataset(6).batches(4).unwrap();
        let test = tiny_dataset(2).batches(4).unwrap();
        let run = tiny_sweep().runs()[0];
        let mut model = for_variant(GraphVariant::Refactored, &run.model_config());

        let history = train_model(model.as_mut(), &train, &test, &run).unwrap();
        assert_eq!(history.epochs.len(), 2);
        for metrics in &history.epochs {
            assert!(metrics.train_loss.is_finite());
            assert!(metrics.test_loss.is_finite());
            assert!((0.0..=1.0).contains(&metrics.test_accuracy));
        }
    }

    #[test]
    fn test_run_sweep_selects_a_run() {
        let train = tiny_dataset(6);
        let test = tiny_dataset(2);
        let best = run_sweep(&tiny_sweep(), GraphVariant::Refactored, &train, &test)
            .unwrap()
            .unwrap();
        assert_eq!(best.epochs.len(), 2);
        assert_eq!(best.run.hidden, 8);
    }

    #[test]
    fn test_aggregate_weights_by_samples() {
        let stats = [
            StepStats {
                loss: 1.0,
                correct: 3,
                samples: 3,
            },
            StepStats {
                loss: 0.0,
                correct: 0,
                samples: 1,
            },
        ];
        let (loss, accuracy) = aggregate(&stats);
        assert!((loss - 0.75).abs() < 1e-6);
        assert!((accuracy - 0.75).abs() < 1e-6);
    }
}
