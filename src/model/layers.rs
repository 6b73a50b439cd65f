//! Building blocks for the graph classifier.
//!
//! Everything here is hand-rolled over `ndarray`: a dense layer, row-wise
//! activations, and a typed-relation message-passing layer. Weights are
//! seeded through `fastrand` so runs are reproducible.

use crate::graph::hetero::EdgeList;
use crate::graph::schema::{GraphVariant, NodeType, Relation};
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;

/// A dense layer `y = x W + b`.
#[derive(Debug, Clone)]
pub struct Linear {
    w: Array2<f32>,
    b: Array1<f32>,
}

impl Linear {
    /// Glorot-uniform initialization from the given generator.
    #[must_use]
    pub fn new(in_dim: usize, out_dim: usize, rng: &mut fastrand::Rng) -> Self {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let w = Array2::from_shape_fn((in_dim, out_dim), |_| {
            rng.f32().mul_add(2.0 * limit, -limit)
        });
        Self {
            w,
            b: Array1::zeros(out_dim),
        }
    }

    /// Forward pass over a batch of rows.
    #[must_use]
    pub fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.w) + &self.b
    }

    /// One SGD step given the layer input and the gradient of the loss with
    /// respect to the layer output.
    pub fn sgd_step(&mut self, x: &Array2<f32>, grad_out: &Array2<f32>, lr: f32) {
        let grad_w = x.t().dot(grad_out);
        self.w.scaled_add(-lr, &grad_w);
        self.b.scaled_add(-lr, &grad_out.sum_axis(Axis(0)));
    }

    /// Output width.
    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.w.ncols()
    }
}

/// In-place rectified linear unit.
pub fn relu_inplace(x: &mut Array2<f32>) {
    x.mapv_inplace(|v| v.max(0.0));
}

/// Row-wise softmax with the usual max-shift for stability.
#[must_use]
pub fn softmax_rows(x: &Array2<f32>) -> Array2<f32> {
    let mut out = x.clone();
    for mut row in out.rows_mut() {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum: f32 = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        }
    }
    out
}

/// In-place inverted dropout: zeroes entries with probability `p` and scales
/// the survivors by `1 / (1 - p)`.
pub fn dropout_inplace(x: &mut Array2<f32>, p: f32, rng: &mut fastrand::Rng) {
    if p <= 0.0 {
        return;
    }
    let keep = 1.0 - p;
    x.mapv_inplace(|v| if rng.f32() < p { 0.0 } else { v / keep });
}

/// One multi-head typed-relation convolution layer.
///
/// Each relation of the variant (forward and reverse) owns `heads`
/// hidden-to-hidden projections; a destination node receives the mean of the
/// head-averaged projected source features over its incoming edges, summed
/// across relations, followed by a rectifier.
#[derive(Debug, Clone)]
pub struct TypedConv {
    hidden: usize,
    weights: BTreeMap<Relation, Vec<Array2<f32>>>,
}

/// All relations a finalized graph of this variant carries: the declared
/// forward relations plus the reverse relations of the cross-type ones.
#[must_use]
pub fn message_relations(variant: GraphVariant) -> Vec<Relation> {
    let mut relations = Vec::new();
    for &relation in variant.relations() {
        relations.push(relation);
        if relation.src != relation.dst {
            relations.push(relation.reversed());
        }
    }
    relations
}

impl TypedConv {
    /// Allocates per-relation, per-head projections for the variant.
    #[must_use]
    pub fn new(
        variant: GraphVariant,
        hidden: usize,
        heads: usize,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let weights = message_relations(variant)
            .into_iter()
            .map(|relation| {
                let per_head = (0..heads.max(1))
                    .map(|_| {
                        let limit = (6.0 / (hidden * 2) as f32).sqrt();
                        Array2::from_shape_fn((hidden, hidden), |_| {
                            rng.f32().mul_add(2.0 * limit, -limit)
                        })
                    })
                    .collect();
                (relation, per_head)
            })
            .collect();
        Self { hidden, weights }
    }

    /// Propagates one round of messages.
    ///
    /// `x` maps node types to hidden-width feature matrices; `edges` holds
    /// the finalized (symmetrized) relations. Relations absent from this
    /// layer's vocabulary are ignored, and empty relations contribute
    /// nothing — both are valid inputs.
    #[must_use]
    pub fn forward(
        &self,
        x: &BTreeMap<NodeType, Array2<f32>>,
        edges: &BTreeMap<Relation, EdgeList>,
    ) -> BTreeMap<NodeType, Array2<f32>> {
        let mut sums: BTreeMap<NodeType, Array2<f32>> = x
            .iter()
            .map(|(&ty, feats)| (ty, Array2::zeros((feats.nrows(), self.hidden))))
            .collect();
        let mut degrees: BTreeMap<NodeType, Array1<f32>> = x
            .iter()
            .map(|(&ty, feats)| (ty, Array1::zeros(feats.nrows())))
            .collect();

        for (relation, pairs) in edges {
            let Some(heads) = self.weights.get(relation) else {
                continue;
            };
            let Some(src) = x.get(&relation.src) else {
                continue;
            };
            if pairs.is_empty() {
                continue;
            }

            let mut projected = Array2::zeros((src.nrows(), self.hidden));
            for w in heads {
                projected += &src.dot(w);
            }
            projected /= heads.len() as f32;

            let (Some(sum), Some(degree)) = (
                sums.get_mut(&relation.dst),
                degrees.get_mut(&relation.dst),
            ) else {
                continue;
            };
            for &(u, v) in pairs {
                let message = projected.row(u).to_owned();
                sum.row_mut(v).scaled_add(1.0, &message);
                degree[v] += 1.0;
            }
        }

        for (ty, sum) in &mut sums {
            let degree = &degrees[ty];
            for (mut row, &d) in sum.rows_mut().into_iter().zip(degree.iter()) {
                if d > 0.0 {
                    row.mapv_inplace(|v| v / d);
                }
            }
            relu_inplace(sum);
        }
        sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_shapes() {
        let mut rng = fastrand::Rng::with_seed(7);
        let layer = Linear::new(3, 4, &mut rng);
        let x = Array2::zeros((5, 3));
        assert_eq!(layer.forward(&x).dim(), (5, 4));
        assert_eq!(layer.out_dim(), 4);
    }

    #[test]
    fn test_sgd_step_moves_weights() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut layer = Linear::new(2, 2, &mut rng);
        let before = layer.forward(&array![[1.0, 1.0]]);
        let grad = array![[1.0, -1.0]];
        layer.sgd_step(&array![[1.0, 1.0]], &grad, 0.1);
        let after = layer.forward(&array![[1.0, 1.0]]);
        assert!(after[[0, 0]] < before[[0, 0]]);
        assert!(after[[0, 1]] > before[[0, 1]]);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let probs = softmax_rows(&array![[1.0, 2.0, 3.0], [0.0, 0.0, 0.0]]);
        for row in probs.rows() {
            let sum: f32 = row.sum();
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_relu() {
        let mut x = array![[-1.0, 2.0]];
        relu_inplace(&mut x);
        assert_eq!(x, array![[0.0, 2.0]]);
    }

    #[test]
    fn test_dropout_zero_probability_is_identity() {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut x = array![[1.0, 2.0]];
        dropout_inplace(&mut x, 0.0, &mut rng);
        assert_eq!(x, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_message_relations_include_reverses() {
        let relations = message_relations(GraphVariant::Refactored);
        // Five forward relations, all cross-type, so ten in total.
        assert_eq!(relations.len(), 10);
    }

    #[test]
    fn test_conv_mean_aggregation() {
        use crate::graph::schema::NodeType;

        let mut rng = fastrand::Rng::with_seed(3);
        let conv = TypedConv::new(GraphVariant::Refactored, 2, 1, &mut rng);

        let mut x = BTreeMap::new();
        x.insert(NodeType::Variable, array![[1.0, 0.0], [0.0, 1.0]]);
        x.insert(NodeType::Constraint, array![[0.0, 0.0]]);

        let mut edges = BTreeMap::new();
        let rel = Relation::forward(NodeType::Variable, NodeType::Constraint);
        edges.insert(rel, vec![(0, 0), (1, 0)]);

        let out = conv.forward(&x, &edges);
        assert_eq!(out[&NodeType::Constraint].dim(), (1, 2));
        assert_eq!(out[&NodeType::Variable].dim(), (2, 2));
        // No incoming edges to variables in this toy input.
        assert_eq!(out[&NodeType::Variable], Array2::zeros((2, 2)));
    }
}
