//! Batching of heterogeneous graphs.
//!
//! A [`GraphBatch`] concatenates the node tables and edge lists of several
//! sample graphs into one large disjoint graph, keeping a per-type *batch
//! vector* (the sample id of every node row) and one stacked label row per
//! sample. Mixing builder variants in one batch is a configuration error.

use crate::graph::hetero::{EdgeList, HeteroGraph};
use crate::graph::schema::{GraphVariant, NodeType, Relation};
use crate::model::error::{ModelError, Result};
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use std::collections::BTreeMap;

/// Several sample graphs merged into one disjoint graph.
#[derive(Debug, Clone)]
pub struct GraphBatch {
    variant: GraphVariant,
    x: BTreeMap<NodeType, Array2<f32>>,
    edges: BTreeMap<Relation, EdgeList>,
    batch: BTreeMap<NodeType, Vec<usize>>,
    labels: Array2<f32>,
    num_samples: usize,
}

impl GraphBatch {
    /// Merges graphs into a batch.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyBatch`] for an empty slice.
    /// - [`ModelError::MixedVariants`] if the graphs disagree on variant.
    /// - [`ModelError::MissingLabel`] if a graph carries no label row.
    pub fn from_graphs(graphs: &[HeteroGraph]) -> Result<Self> {
        let first = graphs.first().ok_or(ModelError::EmptyBatch)?;
        let variant = first.variant();

        let mut x_parts: BTreeMap<NodeType, Vec<ArrayView2<'_, f32>>> = BTreeMap::new();
        let mut edges: BTreeMap<Relation, EdgeList> = BTreeMap::new();
        let mut batch: BTreeMap<NodeType, Vec<usize>> = BTreeMap::new();
        let mut offsets: BTreeMap<NodeType, usize> = BTreeMap::new();
        let mut labels = Array2::zeros((graphs.len(), 2));

        for (sample, graph) in graphs.iter().enumerate() {
            if graph.variant() != variant {
                return Err(ModelError::MixedVariants {
                    first: variant,
                    other: graph.variant(),
                });
            }
            let label = graph
                .label_one_hot()
                .ok_or(ModelError::MissingLabel { index: sample })?;
            labels[[sample, 0]] = label[0];
            labels[[sample, 1]] = label[1];

            for (ty, table) in graph.node_tables() {
                x_parts.entry(ty).or_default().push(table.x.view());
                batch
                    .entry(ty)
                    .or_default()
                    .extend(std::iter::repeat(sample).take(table.len()));
            }

            for (relation, pairs) in graph.relations() {
                let src_offset = offsets.get(&relation.src).copied().unwrap_or(0);
                let dst_offset = offsets.get(&relation.dst).copied().unwrap_or(0);
                edges
                    .entry(relation)
                    .or_default()
                    .extend(pairs.iter().map(|&(u, v)| (u + src_offset, v + dst_offset)));
            }

            // Offsets advance only after the whole sample is merged.
            for (ty, table) in graph.node_tables() {
                *offsets.entry(ty).or_insert(0) += table.len();
            }
        }

        // Feature widths are uniform per variant, so concatenation cannot
        // fail even when some parts have zero rows.
        let x = x_parts
            .into_iter()
            .map(|(ty, parts)| {
                let matrix = concatenate(Axis(0), &parts)
                    .unwrap_or_else(|_| Array2::zeros((0, variant.feature_dim(ty))));
                (ty, matrix)
            })
            .collect();

        Ok(Self {
            variant,
            x,
            edges,
            batch,
            labels,
            num_samples: graphs.len(),
        })
    }

    /// The variant all member graphs share.
    #[must_use]
    pub fn variant(&self) -> GraphVariant {
        self.variant
    }

    /// Number of samples merged into this batch.
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Concatenated feature matrices per node type.
    #[must_use]
    pub fn x(&self) -> &BTreeMap<NodeType, Array2<f32>> {
        &self.x
    }

    /// Concatenated edge lists per relation.
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<Relation, EdgeList> {
        &self.edges
    }

    /// The batch vector of a node type: the sample id of each node row.
    #[must_use]
    pub fn batch_vector(&self, ty: NodeType) -> Option<&[usize]> {
        self.batch.get(&ty).map(Vec::as_slice)
    }

    /// Stacked one-hot labels, one row per sample.
    #[must_use]
    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }

    /// The row index of each sample's first node of the given type,
    /// recovered from the points where the batch vector changes value.
    ///
    /// This is the index-diffing readout of the legacy models: in the
    /// variants with a bias constraint, the first `constraint` row of every
    /// sample is its bias node.
    ///
    /// # Errors
    ///
    /// [`ModelError::MissingNodeType`] if the batch holds no nodes of `ty`.
    pub fn first_rows(&self, ty: NodeType) -> Result<Vec<usize>> {
        let vector = self
            .batch
            .get(&ty)
            .filter(|v| !v.is_empty())
            .ok_or(ModelError::MissingNodeType(ty))?;

        let mut rows = Vec::with_capacity(self.num_samples);
        let mut previous = None;
        for (row, &sample) in vector.iter().enumerate() {
            if previous != Some(sample) {
                rows.push(row);
                previous = Some(sample);
            }
        }
        Ok(rows)
    }
}
