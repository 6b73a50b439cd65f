//! Error types for batching and model invocation.

use crate::graph::schema::{GraphVariant, NodeType};
use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised when graphs and models are combined incorrectly.
///
/// Schema pairing is a caller contract: a graph produced by one builder
/// variant fed to a model expecting another variant's vocabulary is a
/// configuration error and fails fast, never a silently wrong prediction.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The batch was built from a different variant than the model expects.
    #[error("schema mismatch: model expects '{expected}' graphs, got '{found}'")]
    SchemaMismatch {
        /// Variant the model was constructed for.
        expected: GraphVariant,
        /// Variant of the offending batch.
        found: GraphVariant,
    },

    /// A node type required by the model is absent from the batch.
    #[error("missing node type '{0}' in batch")]
    MissingNodeType(NodeType),

    /// Graphs of different variants were mixed in one batch.
    #[error("cannot batch '{first}' graphs with '{other}' graphs")]
    MixedVariants {
        /// Variant of the first graph in the batch.
        first: GraphVariant,
        /// The conflicting variant.
        other: GraphVariant,
    },

    /// A graph without a label row reached the batcher.
    #[error("graph {index} in batch carries no label")]
    MissingLabel {
        /// Position of the unlabeled graph in the batch input.
        index: usize,
    },

    /// An empty slice of graphs was passed to the batcher.
    #[error("cannot build an empty batch")]
    EmptyBatch,
}
