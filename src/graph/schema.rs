//! Node-type and edge-relation vocabulary of the heterogeneous encodings.
//!
//! Every builder variant produces graphs over a subset of the same node-type
//! alphabet but with its own relation vocabulary; the schema of a graph is a
//! contract the consuming model must match.

use std::fmt;

/// Node types appearing across the builder variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    /// A decision variable. One node per base variable, except in the
    /// sat-specific variant where each signed literal value gets its own node.
    Variable,
    /// The two domain values 0 and 1; every graph holds exactly two.
    Value,
    /// A negation operator; allocation policy differs per variant.
    Operator,
    /// A clause (plus, in the legacy variants, a bias constraint at index 0).
    Constraint,
    /// The single synthetic summary node of the generic variant.
    Meta,
}

impl NodeType {
    /// The name used in relation and table keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Value => "value",
            Self::Operator => "operator",
            Self::Constraint => "constraint",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction tag of a typed relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelKind {
    /// A relation emitted by a builder.
    Forward,
    /// A mirror relation added by symmetrization.
    Reverse,
}

/// A typed directed edge relation between two node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Relation {
    /// Source node type.
    pub src: NodeType,
    /// Destination node type.
    pub dst: NodeType,
    /// Forward (builder-emitted) or reverse (symmetrization-added).
    pub kind: RelKind,
}

impl Relation {
    /// A builder-emitted relation from `src` to `dst`.
    #[must_use]
    pub const fn forward(src: NodeType, dst: NodeType) -> Self {
        Self {
            src,
            dst,
            kind: RelKind::Forward,
        }
    }

    /// The mirror of this relation, with endpoints swapped.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
            kind: RelKind::Reverse,
        }
    }

    /// The relation holding this relation's mirrored edges: endpoints
    /// swapped, direction tag toggled.
    #[must_use]
    pub const fn mirror(self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
            kind: match self.kind {
                RelKind::Forward => RelKind::Reverse,
                RelKind::Reverse => RelKind::Forward,
            },
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            RelKind::Forward => "connected_to",
            RelKind::Reverse => "rev_connected_to",
        };
        write!(f, "{}__{name}__{}", self.src, self.dst)
    }
}

/// The three graph-encoding strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphVariant {
    /// One operator node per negative literal occurrence; bias constraint;
    /// label on the `variable` type.
    Original,
    /// One operator node per (positive, negative) literal pair; variable
    /// nodes keyed by signed literal identity. Leverages SAT-specific
    /// structure and is kept for comparison, not recommended as the default.
    SatSpecific,
    /// One operator node per base variable; per-clause constraints with arity
    /// features; a single `meta` node carrying the label. The recommended
    /// default.
    Refactored,
}

impl GraphVariant {
    /// Node types a graph of this variant declares, in table order.
    #[must_use]
    pub const fn node_types(self) -> &'static [NodeType] {
        match self {
            Self::Original | Self::SatSpecific => &[
                NodeType::Constraint,
                NodeType::Operator,
                NodeType::Value,
                NodeType::Variable,
            ],
            Self::Refactored => &[
                NodeType::Constraint,
                NodeType::Meta,
                NodeType::Operator,
                NodeType::Value,
                NodeType::Variable,
            ],
        }
    }

    /// Forward relations a graph of this variant declares.
    ///
    /// Declared relations are always materialized, even when a formula
    /// produces no edges for one of them (an empty relation is valid).
    #[must_use]
    pub const fn relations(self) -> &'static [Relation] {
        const ORIGINAL: &[Relation] = &[
            Relation::forward(NodeType::Variable, NodeType::Value),
            Relation::forward(NodeType::Variable, NodeType::Operator),
            Relation::forward(NodeType::Variable, NodeType::Constraint),
            Relation::forward(NodeType::Operator, NodeType::Constraint),
            Relation::forward(NodeType::Constraint, NodeType::Constraint),
        ];
        // Operators in the pairing variant touch variables only; there is
        // no operator-to-constraint relation in this schema.
        const SAT_SPECIFIC: &[Relation] = &[
            Relation::forward(NodeType::Variable, NodeType::Value),
            Relation::forward(NodeType::Variable, NodeType::Operator),
            Relation::forward(NodeType::Variable, NodeType::Constraint),
            Relation::forward(NodeType::Constraint, NodeType::Constraint),
        ];
        const REFACTORED: &[Relation] = &[
            Relation::forward(NodeType::Variable, NodeType::Value),
            Relation::forward(NodeType::Variable, NodeType::Operator),
            Relation::forward(NodeType::Variable, NodeType::Constraint),
            Relation::forward(NodeType::Operator, NodeType::Constraint),
            Relation::forward(NodeType::Meta, NodeType::Constraint),
        ];
        match self {
            Self::Original => ORIGINAL,
            Self::SatSpecific => SAT_SPECIFIC,
            Self::Refactored => REFACTORED,
        }
    }

    /// Feature width of a node type under this variant.
    ///
    /// Widths are part of the schema contract: models size their input
    /// projections from them rather than sniffing a sample graph.
    #[must_use]
    pub const fn feature_dim(self, ty: NodeType) -> usize {
        match (self, ty) {
            // [constant 1, #variables, #clauses]
            (Self::Original, NodeType::Variable) => 3,
            (_, NodeType::Constraint | NodeType::Meta) => 2,
            _ => 1,
        }
    }

    /// The node type carrying the one-hot sample label.
    #[must_use]
    pub const fn label_type(self) -> NodeType {
        match self {
            Self::Original | Self::SatSpecific => NodeType::Variable,
            Self::Refactored => NodeType::Meta,
        }
    }

    /// Short name used in CLI arguments and log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::SatSpecific => "sat-specific",
            Self::Refactored => "refactored",
        }
    }
}

impl fmt::Display for GraphVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_display() {
        let rel = Relation::forward(NodeType::Variable, NodeType::Value);
        assert_eq!(rel.to_string(), "variable__connected_to__value");
        assert_eq!(rel.reversed().to_string(), "value__rev_connected_to__variable");
    }

    #[test]
    fn test_refactored_declares_meta() {
        assert!(GraphVariant::Refactored
            .node_types()
            .contains(&NodeType::Meta));
        assert!(!GraphVariant::Original.node_types().contains(&NodeType::Meta));
    }

    #[test]
    fn test_label_placement() {
        assert_eq!(GraphVariant::Original.label_type(), NodeType::Variable);
        assert_eq!(GraphVariant::SatSpecific.label_type(), NodeType::Variable);
        assert_eq!(GraphVariant::Refactored.label_type(), NodeType::Meta);
    }

    #[test]
    fn test_feature_dims() {
        assert_eq!(GraphVariant::Original.feature_dim(NodeType::Variable), 3);
        assert_eq!(GraphVariant::SatSpecific.feature_dim(NodeType::Variable), 1);
        assert_eq!(GraphVariant::Refactored.feature_dim(NodeType::Constraint), 2);
        assert_eq!(GraphVariant::Refactored.feature_dim(NodeType::Meta), 2);
        assert_eq!(GraphVariant::Refactored.feature_dim(NodeType::Operator), 1);
    }

    #[test]
    fn test_sat_specific_has_no_operator_constraint_relation() {
        let rel = Relation::forward(NodeType::Operator, NodeType::Constraint);
        assert!(!GraphVariant::SatSpecific.relations().contains(&rel));
        assert!(GraphVariant::Original.relations().contains(&rel));
    }
}
