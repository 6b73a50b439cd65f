//! The schema-matching graph classifiers.
//!
//! Two readout strategies over a shared trunk (per-type input projections
//! followed by typed message-passing layers):
//!
//! - [`Hgt`] locates each sample's first `constraint` node through the
//!   batch-vector boundaries ([`GraphBatch::first_rows`]) — the batching
//!   workaround required by the variants without an anchor node.
//! - [`HgtMeta`] reads the single `meta` node of the refactored variant
//!   directly; one fixed-cardinality node per sample, no index hunting.
//!   This is the reference pattern.
//!
//! The trunk is a fixed, seeded feature extractor; only the softmax
//! classification head trains, through the closed-form softmax
//! cross-entropy gradient. A batch whose variant does not match the model's
//! schema fails fast with [`ModelError::SchemaMismatch`].

use crate::graph::schema::{GraphVariant, NodeType};
use crate::model::batch::GraphBatch;
use crate::model::error::{ModelError, Result};
use crate::model::layers::{dropout_inplace, relu_inplace, softmax_rows, Linear, TypedConv};
use ndarray::Array2;
use std::collections::BTreeMap;

/// Hyperparameters of one model instance.
#[derive(Debug, Clone)]
pub struct HgtConfig {
    /// Hidden embedding width.
    pub hidden: usize,
    /// Number of message-passing layers.
    pub layers: usize,
    /// Attention-head count per relation.
    pub heads: usize,
    /// Dropout probability applied between layers during training.
    pub dropout: f32,
    /// Seed for weight initialization and dropout masks.
    pub seed: u64,
}

impl Default for HgtConfig {
    fn default() -> Self {
        Self {
            hidden: 128,
            layers: 4,
            heads: 2,
            dropout: 0.0,
            seed: 42,
        }
    }
}

/// Loss and accuracy counters for one batch pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepStats {
    /// Mean cross-entropy over the batch.
    pub loss: f32,
    /// Samples whose argmax prediction matched the label.
    pub correct: usize,
    /// Samples in the batch.
    pub samples: usize,
}

/// A trainable sat/unsat classifier over batched heterogeneous graphs.
pub trait Classifier {
    /// The graph variant this model's schema matches.
    fn variant(&self) -> GraphVariant;

    /// Class probabilities, one row per sample.
    ///
    /// # Errors
    ///
    /// [`ModelError::SchemaMismatch`] if the batch variant differs from
    /// [`Classifier::variant`].
    fn forward(&self, batch: &GraphBatch) -> Result<Array2<f32>>;

    /// One training step: forward with dropout, head update, batch stats.
    ///
    /// # Errors
    ///
    /// Same schema checks as [`Classifier::forward`].
    fn train_step(&mut self, batch: &GraphBatch, lr: f32) -> Result<StepStats>;

    /// Loss and accuracy on a batch without updating any weights.
    ///
    /// # Errors
    ///
    /// Same schema checks as [`Classifier::forward`].
    fn evaluate(&self, batch: &GraphBatch) -> Result<StepStats>;
}

/// Instantiates the model paired with a builder variant: the meta readout
/// for the refactored variant, the index-diff readout otherwise.
#[must_use]
pub fn for_variant(variant: GraphVariant, config: &HgtConfig) -> Box<dyn Classifier> {
    match variant {
        GraphVariant::Refactored => Box::new(HgtMeta::new(config)),
        GraphVariant::Original | GraphVariant::SatSpecific => {
            Box::new(Hgt::new(variant, config))
        }
    }
}

/// Where the per-sample embedding is read from.
#[derive(Debug, Clone, Copy)]
enum Readout {
    FirstConstraint,
    Meta,
}

/// Shared trunk + head; the two public models differ only in readout.
struct Core {
    variant: GraphVariant,
    readout: Readout,
    input: BTreeMap<NodeType, Linear>,
    convs: Vec<TypedConv>,
    head: Linear,
    dropout: f32,
    rng: fastrand::Rng,
}

impl Core {
    fn new(variant: GraphVariant, readout: Readout, config: &HgtConfig) -> Self {
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let input = variant
            .node_types()
            .iter()
            .map(|&ty| {
                (
                    ty,
                    Linear::new(variant.feature_dim(ty), config.hidden, &mut rng),
                )
            })
            .collect();
        let convs = (0..config.layers)
            .map(|_| TypedConv::new(variant, config.hidden, config.heads, &mut rng))
            .collect();
        let head = Linear::new(config.hidden, 2, &mut rng);
        Self {
            variant,
            readout,
            input,
            convs,
            head,
            dropout: config.dropout,
            rng,
        }
    }

    fn check_schema(&self, batch: &GraphBatch) -> Result<()> {
        if batch.variant() == self.variant {
            Ok(())
        } else {
            Err(ModelError::SchemaMismatch {
                expected: self.variant,
                found: batch.variant(),
            })
        }
    }

    /// Per-sample embeddings after input projection, message passing and
    /// readout. A dropout generator is passed only during training.
    fn sample_embeddings(
        &self,
        batch: &GraphBatch,
        mut dropout_rng: Option<&mut fastrand::Rng>,
    ) -> Result<Array2<f32>> {
        self.check_schema(batch)?;

        let mut x: BTreeMap<NodeType, Array2<f32>> = BTreeMap::new();
        for (&ty, projection) in &self.input {
            let feats = batch
                .x()
                .get(&ty)
                .ok_or(ModelError::MissingNodeType(ty))?;
            let mut h = projection.forward(feats);
            relu_inplace(&mut h);
            x.insert(ty, h);
        }

        for conv in &self.convs {
            x = conv.forward(&x, batch.edges());
            if let Some(rng) = dropout_rng.as_deref_mut() {
                if self.dropout > 0.0 {
                    for h in x.values_mut() {
                        dropout_inplace(h, self.dropout, rng);
                    }
                }
            }
        }

        match self.readout {
            Readout::Meta => x
                .remove(&NodeType::Meta)
                .ok_or(ModelError::MissingNodeType(NodeType::Meta)),
            Readout::FirstConstraint => {
                let rows = batch.first_rows(NodeType::Constraint)?;
                let hidden = x
                    .get(&NodeType::Constraint)
                    .ok_or(ModelError::MissingNodeType(NodeType::Constraint))?;
                let mut pooled = Array2::zeros((rows.len(), hidden.ncols()));
                for (i, &row) in rows.iter().enumerate() {
                    pooled.row_mut(i).assign(&hidden.row(row));
                }
                Ok(pooled)
            }
        }
    }

    fn probs(&self, batch: &GraphBatch) -> Result<Array2<f32>> {
        let pooled = self.sample_embeddings(batch, None)?;
        Ok(softmax_rows(&self.head.forward(&pooled)))
    }

    fn stats(probs: &Array2<f32>, labels: &Array2<f32>) -> StepStats {
        let samples = probs.nrows();
        let mut loss = 0.0;
        let mut correct = 0;
        for (p, y) in probs.rows().into_iter().zip(labels.rows()) {
            loss -= y[0] * (p[0] + 1e-9).ln() + y[1] * (p[1] + 1e-9).ln();
            let predicted = usize::from(p[1] > p[0]);
            let target = usize::from(y[1] > y[0]);
            if predicted == target {
                correct += 1;
            }
        }
        StepStats {
            loss: loss / samples as f32,
            correct,
            samples,
        }
    }

    fn train_step(&mut self, batch: &GraphBatch, lr: f32) -> Result<StepStats> {
        // The generator advances across steps; clone out to sidestep the
        // field borrow while the trunk is in use, then store it back.
        let mut rng = self.rng.clone();
        let pooled = self.sample_embeddings(batch, Some(&mut rng))?;
        self.rng = rng;

        let probs = softmax_rows(&self.head.forward(&pooled));
        let stats = Self::stats(&probs, batch.labels());
        // Softmax + cross-entropy: dL/dlogits = (p - y) / n.
        let grad = (&probs - batch.labels()) / batch.num_samples() as f32;
        self.head.sgd_step(&pooled, &grad, lr);
        Ok(stats)
    }
}

/// Classifier with the index-diff readout, paired with the legacy variants.
pub struct Hgt {
    core: Core,
}

impl Hgt {
    /// Builds a model matching the given variant's schema.
    #[must_use]
    pub fn new(variant: GraphVariant, config: &HgtConfig) -> Self {
        Self {
            core: Core::new(variant, Readout::FirstConstraint, config),
        }
    }
}

impl Classifier for Hgt {
    fn variant(&self) -> GraphVariant {
        self.core.variant
    }

    fn forward(&self, batch: &GraphBatch) -> Result<Array2<f32>> {
        self.core.probs(batch)
    }

    fn train_step(&mut self, batch: &GraphBatch, lr: f32) -> Result<StepStats> {
        self.core.train_step(batch, lr)
    }

    fn evaluate(&self, batch: &GraphBatch) -> Result<StepStats> {
        let probs = self.core.probs(batch)?;
        Ok(Core::stats(&probs, batch.labels()))
    }
}

/// Classifier reading the `meta` anchor node of the refactored variant.
pub struct HgtMeta {
    core: Core,
}

impl HgtMeta {
    /// Builds a model for the refactored variant.
    #[must_use]
    pub fn new(config: &HgtConfig) -> Self {
        Self {
            core: Core::new(GraphVariant::Refactored, Readout::Meta, config),
        }
    }
}

impl Classifier for HgtMeta {
    fn variant(&self) -> GraphVariant {
        self.core.variant
    }

    fn forward(&self, batch: &GraphBatch) -> Result<Array2<f32>> {
        self.core.probs(batch)
    }

    fn train_step(&mut self, batch: &GraphBatch, lr: f32) -> Result<StepStats> {
        self.core.train_step(batch, lr)
    }

    fn evaluate(&self, batch: &GraphBatch) -> Result<StepStats> {
        let probs = self.core.probs(batch)?;
        Ok(Core::stats(&probs, batch.labels()))
    }
}
