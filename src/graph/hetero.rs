//! The heterogeneous graph artifact produced by the builders.
//!
//! A [`HeteroGraph`] is a set of per-node-type feature tables plus typed
//! directed edge relations in COO pair form, tagged with the
//! [`GraphVariant`] that produced it. Graphs are constructed once and never
//! mutated afterwards; the final construction step materializes every
//! relation the variant declares (empty relations are valid) and mirrors
//! each directed relation so downstream convolutions can treat the graph as
//! undirected.

use crate::graph::schema::{GraphVariant, NodeType, Relation};
use ndarray::Array2;
use std::collections::BTreeMap;
use tracing::warn;

/// A COO edge list local to one typed relation.
pub type EdgeList = Vec<(usize, usize)>;

/// Feature table of one node type, with optional per-sample label rows.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable {
    /// Feature matrix, one row per node.
    pub x: Array2<f32>,
    /// Label rows; present only on the variant's label-carrying type and
    /// holding exactly one one-hot row per sample.
    pub y: Option<Array2<f32>>,
}

impl NodeTable {
    /// Builds a table from feature rows of uniform `width`.
    ///
    /// An empty row set is a valid table of shape `(0, width)`: a formula
    /// with no negative literals still declares its `operator` type.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f32>], width: usize) -> Self {
        let mut x = Array2::zeros((rows.len(), width));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                x[[i, j]] = v;
            }
        }
        Self { x, y: None }
    }

    /// Number of nodes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    /// `true` if the table holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A typed heterogeneous graph for one CNF sample.
#[derive(Debug, Clone, PartialEq)]
pub struct HeteroGraph {
    variant: GraphVariant,
    nodes: BTreeMap<NodeType, NodeTable>,
    edges: BTreeMap<Relation, EdgeList>,
}

impl HeteroGraph {
    /// Starts an empty graph for the given variant.
    #[must_use]
    pub fn new(variant: GraphVariant) -> Self {
        Self {
            variant,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    /// The builder variant that produced this graph.
    #[must_use]
    pub fn variant(&self) -> GraphVariant {
        self.variant
    }

    /// Installs the feature table for a node type.
    pub fn set_nodes(&mut self, ty: NodeType, table: NodeTable) {
        self.nodes.insert(ty, table);
    }

    /// Attaches the one-hot sample label to the variant's label-carrying
    /// node type.
    ///
    /// # Panics
    ///
    /// Panics if the label type's table has not been installed yet; builders
    /// always install tables before labels.
    pub fn set_label(&mut self, one_hot: [f32; 2]) {
        let ty = self.variant.label_type();
        let table = self
            .nodes
            .get_mut(&ty)
            .unwrap_or_else(|| panic!("label type {ty} has no node table"));
        let mut y = Array2::zeros((1, 2));
        y[[0, 0]] = one_hot[0];
        y[[0, 1]] = one_hot[1];
        table.y = Some(y);
    }

    /// Installs the edge list of one forward relation.
    pub fn set_edges(&mut self, relation: Relation, pairs: EdgeList) {
        self.edges.insert(relation, pairs);
    }

    /// Finalizes construction: materializes every relation the variant
    /// declares and mirrors each directed relation.
    ///
    /// A declared relation with no edges stays as a valid empty relation and
    /// is logged at `warn` level, never treated as an error. Cross-type
    /// relations gain a reverse relation; same-type relations get their
    /// reversed pairs appended in place, matching the undirected transform
    /// of the encoding this crate models.
    pub fn finalize(&mut self) {
        for &relation in self.variant.relations() {
            let pairs = self.edges.entry(relation).or_default();
            if pairs.is_empty() {
                warn!(%relation, "relation has no edges");
            }

            let reversed: EdgeList = pairs.iter().map(|&(u, v)| (v, u)).collect();
            if relation.src == relation.dst {
                pairs.extend(reversed);
            } else {
                self.edges.insert(relation.reversed(), reversed);
            }
        }
    }

    /// The feature table of a node type, if the variant declares it.
    #[must_use]
    pub fn node_table(&self, ty: NodeType) -> Option<&NodeTable> {
        self.nodes.get(&ty)
    }

    /// Number of nodes of a type (0 for undeclared types).
    #[must_use]
    pub fn node_count(&self, ty: NodeType) -> usize {
        self.nodes.get(&ty).map_or(0, NodeTable::len)
    }

    /// The edge list of a relation, if present.
    #[must_use]
    pub fn edge_list(&self, relation: Relation) -> Option<&EdgeList> {
        self.edges.get(&relation)
    }

    /// Iterates all node tables in type order.
    pub fn node_tables(&self) -> impl Iterator<Item = (NodeType, &NodeTable)> {
        self.nodes.iter().map(|(&ty, table)| (ty, table))
    }

    /// Iterates all relations (forward and reverse) in relation order.
    pub fn relations(&self) -> impl Iterator<Item = (Relation, &EdgeList)> {
        self.edges.iter().map(|(&rel, pairs)| (rel, pairs))
    }

    /// The one-hot label row attached to the variant's label type.
    #[must_use]
    pub fn label_one_hot(&self) -> Option<[f32; 2]> {
        let table = self.nodes.get(&self.variant.label_type())?;
        let y = table.y.as_ref()?;
        Some([y[[0, 0]], y[[0, 1]]])
    }
}
