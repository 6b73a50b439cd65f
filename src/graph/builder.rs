//! The three graph-construction strategies.
//!
//! Each builder maps a [`Cnf`] to a [`HeteroGraph`] with its own node/edge
//! schema; all three share the variable-to-domain scaffold and the
//! finalization step (declared-relation materialization + symmetrization).
//! Builders are pure: they borrow the formula, hold no cross-call state, and
//! produce an independent graph per call, so construction parallelizes
//! freely across formulas.

use crate::graph::hetero::{EdgeList, HeteroGraph, NodeTable};
use crate::graph::schema::{GraphVariant, NodeType, Relation};
use crate::sat::clause::{base_index, is_negative, Lit};
use crate::sat::cnf::Cnf;
use bit_vec::BitVec;
use rustc_hash::{FxHashMap, FxHashSet};

/// Addressing mode for the variable-to-domain scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    /// The variable id itself is the variable-node index. Used by the
    /// builders that key variable nodes by base-variable index.
    Direct,
    /// The enumeration position of the id is the variable-node index. Used
    /// by the pairing builder, whose variable nodes are keyed by signed
    /// literal identity and addressed through an id-to-index table.
    Remapped,
}

/// The fixed bipartite scaffold connecting every variable node to both
/// domain-value nodes (0 and 1). Structural, not CNF-dependent.
#[must_use]
pub fn variable_to_domain_edges(ids: &[usize], mode: AddressMode) -> EdgeList {
    ids.iter()
        .enumerate()
        .flat_map(|(position, &id)| {
            let node = match mode {
                AddressMode::Direct => id,
                AddressMode::Remapped => position,
            };
            [(node, 0), (node, 1)]
        })
        .collect()
}

/// A strategy turning a CNF formula into one heterogeneous graph encoding.
pub trait GraphBuilder {
    /// The schema variant this builder produces.
    fn variant(&self) -> GraphVariant;

    /// Builds a fresh graph for the formula. Never mutates the formula;
    /// calling twice on the same input yields structurally identical graphs.
    fn build(&self, cnf: &Cnf) -> HeteroGraph;
}

/// Builds the graph encoding of a formula for the given variant.
#[must_use]
pub fn build_graph(cnf: &Cnf, variant: GraphVariant) -> HeteroGraph {
    match variant {
        GraphVariant::Original => LiteralPerOperator.build(cnf),
        GraphVariant::SatSpecific => LiteralPairing.build(cnf),
        GraphVariant::Refactored => OperatorPerVariable.build(cnf),
    }
}

/// The two domain-value nodes shared by every variant.
fn value_table() -> NodeTable {
    NodeTable::from_rows(&[vec![0.0], vec![1.0]], 1)
}

/// One negation-operator node per negative literal *occurrence*.
///
/// Exposes clause-level negation directly: a variable negated in three
/// clauses gets three operator nodes. Constraint index 0 is a bias node
/// linked to every real clause; the sample label rides on the `variable`
/// type.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralPerOperator;

impl GraphBuilder for LiteralPerOperator {
    fn variant(&self) -> GraphVariant {
        GraphVariant::Original
    }

    fn build(&self, cnf: &Cnf) -> HeteroGraph {
        let n_base = cnf.num_base_variables();
        let n_clauses = cnf.num_clauses();

        // Bias constraint at index 0, then one constraint per clause.
        let mut constraints = vec![vec![1.0, 0.0]];
        let mut operator_count = 0usize;

        let variable_to_value =
            variable_to_domain_edges(cnf.base_variables(), AddressMode::Direct);
        let mut variable_to_operator = EdgeList::new();
        let mut variable_to_constraint = EdgeList::new();
        let mut operator_to_constraint = EdgeList::new();
        let mut constraint_to_constraint = EdgeList::new();

        for (i, clause) in cnf.clauses().iter().enumerate() {
            let constraint = i + 1;
            constraints.push(vec![0.0, 1.0]);
            for lit in clause.iter() {
                let variable = base_index(lit);
                if is_negative(lit) {
                    variable_to_operator.push((variable, operator_count));
                    operator_to_constraint.push((operator_count, constraint));
                    operator_count += 1;
                } else {
                    variable_to_constraint.push((variable, constraint));
                }
            }
            constraint_to_constraint.push((0, constraint));
        }

        let variable_row = vec![1.0, n_base as f32, n_clauses as f32];
        let mut graph = HeteroGraph::new(self.variant());
        graph.set_nodes(
            NodeType::Variable,
            NodeTable::from_rows(&vec![variable_row; n_base], 3),
        );
        graph.set_nodes(NodeType::Value, value_table());
        graph.set_nodes(
            NodeType::Operator,
            NodeTable::from_rows(&vec![vec![1.0]; operator_count], 1),
        );
        graph.set_nodes(NodeType::Constraint, NodeTable::from_rows(&constraints, 2));
        graph.set_label(cnf.label().one_hot());

        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Value),
            variable_to_value,
        );
        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Operator),
            variable_to_operator,
        );
        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Constraint),
            variable_to_constraint,
        );
        graph.set_edges(
            Relation::forward(NodeType::Operator, NodeType::Constraint),
            operator_to_constraint,
        );
        graph.set_edges(
            Relation::forward(NodeType::Constraint, NodeType::Constraint),
            constraint_to_constraint,
        );
        graph.finalize();
        graph
    }
}

/// One shared negation-operator node per (positive, negative) literal pair.
///
/// Variable nodes are keyed by signed literal identity, so both polarities
/// of a base variable may each get their own node (feature ±1); when both
/// appear, a single operator links them. Every literal occurrence connects
/// directly to its clause. Leverages SAT-specific variable/negation duality
/// and is kept for comparison, not as the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralPairing;

impl GraphBuilder for LiteralPairing {
    fn variant(&self) -> GraphVariant {
        GraphVariant::SatSpecific
    }

    fn build(&self, cnf: &Cnf) -> HeteroGraph {
        let variables = cnf.variables();
        let index: FxHashMap<Lit, usize> = variables
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();

        let mut constraints = vec![vec![1.0, 0.0]];
        let mut operator_count = 0usize;
        // Pairs that already share an operator. Idempotent: duplicate
        // clauses and repeated negative occurrences allocate nothing new.
        let mut paired: FxHashSet<(usize, usize)> = FxHashSet::default();

        let positions: Vec<usize> = (0..variables.len()).collect();
        let variable_to_value = variable_to_domain_edges(&positions, AddressMode::Remapped);
        let mut variable_to_operator = EdgeList::new();
        let mut variable_to_constraint = EdgeList::new();
        let mut constraint_to_constraint = EdgeList::new();

        for (i, clause) in cnf.clauses().iter().enumerate() {
            let constraint = i + 1;
            constraints.push(vec![0.0, 1.0]);
            for lit in clause.iter() {
                let variable = index[&lit];
                if is_negative(lit) {
                    if let Some(&positive) = index.get(&-lit) {
                        if paired.insert((positive, variable)) {
                            variable_to_operator.push((positive, operator_count));
                            variable_to_operator.push((variable, operator_count));
                            operator_count += 1;
                        }
                    }
                }
                variable_to_constraint.push((variable, constraint));
            }
            constraint_to_constraint.push((0, constraint));
        }

        let variable_rows: Vec<Vec<f32>> = variables
            .iter()
            .map(|&v| vec![if v > 0 { 1.0 } else { -1.0 }])
            .collect();

        let mut graph = HeteroGraph::new(self.variant());
        graph.set_nodes(NodeType::Variable, NodeTable::from_rows(&variable_rows, 1));
        graph.set_nodes(NodeType::Value, value_table());
        graph.set_nodes(
            NodeType::Operator,
            NodeTable::from_rows(&vec![vec![1.0]; operator_count], 1),
        );
        graph.set_nodes(NodeType::Constraint, NodeTable::from_rows(&constraints, 2));
        graph.set_label(cnf.label().one_hot());

        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Value),
            variable_to_value,
        );
        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Operator),
            variable_to_operator,
        );
        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Constraint),
            variable_to_constraint,
        );
        graph.set_edges(
            Relation::forward(NodeType::Constraint, NodeType::Constraint),
            constraint_to_constraint,
        );
        graph.finalize();
        graph
    }
}

/// Exactly one negation-operator node per *base variable*.
///
/// Operators are allocated eagerly (feature −1) whether or not the variable
/// is ever negated, and the operator index equals the variable index.
/// Constraints carry `[1, arity]` with no bias node; a single `meta` node
/// holds `[#clauses, #base-variables]` and the sample label. The most
/// compact, generic encoding and the recommended default.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorPerVariable;

impl GraphBuilder for OperatorPerVariable {
    fn variant(&self) -> GraphVariant {
        GraphVariant::Refactored
    }

    fn build(&self, cnf: &Cnf) -> HeteroGraph {
        let n_base = cnf.num_base_variables();
        let n_clauses = cnf.num_clauses();

        let mut constraints = Vec::with_capacity(n_clauses);
        let mut negated = BitVec::from_elem(n_base, false);

        let variable_to_value =
            variable_to_domain_edges(cnf.base_variables(), AddressMode::Direct);
        let mut variable_to_operator = EdgeList::new();
        let mut variable_to_constraint = EdgeList::new();
        let mut operator_to_constraint = EdgeList::new();
        let mut meta_to_constraint = EdgeList::new();

        for (constraint, clause) in cnf.clauses().iter().enumerate() {
            constraints.push(vec![1.0, clause.len() as f32]);
            for lit in clause.iter() {
                let variable = base_index(lit);
                if is_negative(lit) {
                    // Operator index equals variable index; link once, on the
                    // first negative occurrence.
                    if !negated[variable] {
                        negated.set(variable, true);
                        variable_to_operator.push((variable, variable));
                    }
                    operator_to_constraint.push((variable, constraint));
                } else {
                    variable_to_constraint.push((variable, constraint));
                }
            }
            meta_to_constraint.push((0, constraint));
        }

        let mut graph = HeteroGraph::new(self.variant());
        graph.set_nodes(
            NodeType::Variable,
            NodeTable::from_rows(&vec![vec![1.0]; n_base], 1),
        );
        graph.set_nodes(NodeType::Value, value_table());
        graph.set_nodes(
            NodeType::Operator,
            NodeTable::from_rows(&vec![vec![-1.0]; n_base], 1),
        );
        graph.set_nodes(NodeType::Constraint, NodeTable::from_rows(&constraints, 2));
        graph.set_nodes(
            NodeType::Meta,
            NodeTable::from_rows(&[vec![n_clauses as f32, n_base as f32]], 2),
        );
        graph.set_label(cnf.label().one_hot());

        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Value),
            variable_to_value,
        );
        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Operator),
            variable_to_operator,
        );
        graph.set_edges(
            Relation::forward(NodeType::Variable, NodeType::Constraint),
            variable_to_constraint,
        );
        graph.set_edges(
            Relation::forward(NodeType::Operator, NodeType::Constraint),
            operator_to_constraint,
        );
        graph.set_edges(
            Relation::forward(NodeType::Meta, NodeType::Constraint),
            meta_to_constraint,
        );
        graph.finalize();
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use crate::sat::cnf::Label;

    /// The worked example: {(1 v -2), (-1 v 2)}.
    fn example() -> Cnf {
        Cnf::new(
            vec![Clause::new([1, -2]), Clause::new([-1, 2])],
            Label::Sat,
        )
        .unwrap()
    }

    fn all_positive() -> Cnf {
        Cnf::new(vec![Clause::new([1, 2]), Clause::new([2, 3])], Label::Sat).unwrap()
    }

    #[test]
    fn test_original_operator_per_negative_occurrence() {
        let graph = example().to_graph(GraphVariant::Original);
        assert_eq!(graph.node_count(NodeType::Variable), 2);
        assert_eq!(graph.node_count(NodeType::Operator), 2);
        // Bias constraint plus one per clause.
        assert_eq!(graph.node_count(NodeType::Constraint), 3);
        assert_eq!(graph.node_count(NodeType::Value), 2);
        assert_eq!(graph.label_one_hot(), Some([0.0, 1.0]));
    }

    #[test]
    fn test_original_operator_count_tracks_occurrences() {
        // Variable 1 negated in both clauses: two operator nodes for it.
        let cnf = Cnf::new(
            vec![Clause::new([-1, 2]), Clause::new([-1, -2])],
            Label::Unsat,
        )
        .unwrap();
        let graph = cnf.to_graph(GraphVariant::Original);
        assert_eq!(graph.node_count(NodeType::Operator), 3);
        assert_eq!(graph.node_count(NodeType::Operator), cnf.negative_occurrences());
    }

    #[test]
    fn test_original_all_positive_formula_has_empty_operator_type() {
        let graph = all_positive().to_graph(GraphVariant::Original);
        assert_eq!(graph.node_count(NodeType::Operator), 0);
        let rel = Relation::forward(NodeType::Variable, NodeType::Operator);
        assert_eq!(graph.edge_list(rel), Some(&Vec::new()));
    }

    #[test]
    fn test_original_variable_features() {
        let graph = example().to_graph(GraphVariant::Original);
        let table = graph.node_table(NodeType::Variable).unwrap();
        // [constant 1, #variables, #clauses]
        assert_eq!(table.x.row(0).to_vec(), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_original_bias_constraint_links_every_clause() {
        let graph = example().to_graph(GraphVariant::Original);
        let rel = Relation::forward(NodeType::Constraint, NodeType::Constraint);
        let pairs = graph.edge_list(rel).unwrap();
        // Forward pairs (0 -> each clause) plus their in-place mirrors.
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(0, 2)));
        assert!(pairs.contains(&(1, 0)));
        assert!(pairs.contains(&(2, 0)));
    }

    #[test]
    fn test_sat_specific_one_operator_per_polarity_pair() {
        let graph = example().to_graph(GraphVariant::SatSpecific);
        // Four signed literal values, each its own variable node.
        assert_eq!(graph.node_count(NodeType::Variable), 4);
        // Both base variables appear in both polarities: two pairs.
        assert_eq!(graph.node_count(NodeType::Operator), 2);
    }

    #[test]
    fn test_sat_specific_dedup_is_idempotent() {
        // -1 occurs three times (including a duplicate clause) and -2 once;
        // each polarity pair still shares exactly one operator.
        let cnf = Cnf::new(
            vec![
                Clause::new([-1, 2]),
                Clause::new([-1, 2]),
                Clause::new([1, -2]),
                Clause::new([-1, -2]),
            ],
            Label::Unsat,
        )
        .unwrap();
        let graph = cnf.to_graph(GraphVariant::SatSpecific);
        assert_eq!(graph.node_count(NodeType::Operator), 2);
        let rel = Relation::forward(NodeType::Variable, NodeType::Operator);
        // Two endpoints per shared operator.
        assert_eq!(graph.edge_list(rel).unwrap().len(), 4);
    }

    #[test]
    fn test_sat_specific_unpaired_negative_literal_gets_no_operator() {
        // -1 appears but 1 never does: no positive counterpart, no operator.
        let cnf = Cnf::new(vec![Clause::new([-1, 2])], Label::Sat).unwrap();
        let graph = cnf.to_graph(GraphVariant::SatSpecific);
        assert_eq!(graph.node_count(NodeType::Operator), 0);
    }

    #[test]
    fn test_sat_specific_every_occurrence_connects_to_its_clause() {
        let graph = example().to_graph(GraphVariant::SatSpecific);
        let rel = Relation::forward(NodeType::Variable, NodeType::Constraint);
        // Two clauses of two literals each.
        assert_eq!(graph.edge_list(rel).unwrap().len(), 4);
    }

    #[test]
    fn test_sat_specific_polarity_features() {
        let graph = example().to_graph(GraphVariant::SatSpecific);
        let table = graph.node_table(NodeType::Variable).unwrap();
        // Variables sorted: -2, -1, 1, 2.
        assert_eq!(table.x.column(0).to_vec(), vec![-1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_refactored_worked_example() {
        let graph = example().to_graph(GraphVariant::Refactored);
        assert_eq!(graph.node_count(NodeType::Variable), 2);
        // One operator per base variable, regardless of occurrence counts.
        assert_eq!(graph.node_count(NodeType::Operator), 2);
        assert_eq!(graph.node_count(NodeType::Constraint), 2);
        assert_eq!(graph.node_count(NodeType::Meta), 1);
        assert_eq!(graph.label_one_hot(), Some([0.0, 1.0]));
    }

    #[test]
    fn test_refactored_operators_allocated_eagerly() {
        // No negations at all: operator nodes still exist, one per base
        // variable, with an empty variable-to-operator relation.
        let graph = all_positive().to_graph(GraphVariant::Refactored);
        assert_eq!(graph.node_count(NodeType::Operator), 3);
        let rel = Relation::forward(NodeType::Variable, NodeType::Operator);
        assert_eq!(graph.edge_list(rel), Some(&Vec::new()));
    }

    #[test]
    fn test_refactored_operator_index_equals_variable_index() {
        let graph = example().to_graph(GraphVariant::Refactored);
        let rel = Relation::forward(NodeType::Variable, NodeType::Operator);
        for &(u, v) in graph.edge_list(rel).unwrap() {
            assert_eq!(u, v);
        }
    }

    #[test]
    fn test_refactored_constraint_features_hold_arity() {
        let cnf = Cnf::new(
            vec![Clause::new([1, 2, 3]), Clause::new([-1, 2])],
            Label::Sat,
        )
        .unwrap();
        let graph = cnf.to_graph(GraphVariant::Refactored);
        let table = graph.node_table(NodeType::Constraint).unwrap();
        assert_eq!(table.x.row(0).to_vec(), vec![1.0, 3.0]);
        assert_eq!(table.x.row(1).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_refactored_meta_features() {
        let graph = example().to_graph(GraphVariant::Refactored);
        let table = graph.node_table(NodeType::Meta).unwrap();
        // [#clauses, #base-variables]
        assert_eq!(table.x.row(0).to_vec(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_determinism_across_builds() {
        let cnf = Cnf::new(
            vec![
                Clause::new([1, -2, 3]),
                Clause::new([-1, -3]),
                Clause::new([2, 3]),
            ],
            Label::Unsat,
        )
        .unwrap();
        for variant in [
            GraphVariant::Original,
            GraphVariant::SatSpecific,
            GraphVariant::Refactored,
        ] {
            assert_eq!(cnf.to_graph(variant), cnf.to_graph(variant));
        }
    }

    #[test]
    fn test_symmetrization_every_edge_has_a_mirror() {
        let cnf = Cnf::new(
            vec![Clause::new([1, -2, 3]), Clause::new([-1, -3])],
            Label::Sat,
        )
        .unwrap();
        for variant in [
            GraphVariant::Original,
            GraphVariant::SatSpecific,
            GraphVariant::Refactored,
        ] {
            let graph = cnf.to_graph(variant);
            for (relation, pairs) in graph.relations() {
                let mirror = if relation.src == relation.dst {
                    relation
                } else {
                    relation.mirror()
                };
                let mirror_pairs = graph.edge_list(mirror).unwrap();
                for &(u, v) in pairs {
                    assert!(
                        mirror_pairs.contains(&(v, u)),
                        "missing mirror of ({u}, {v}) in {mirror} for {variant}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_domain_edges_direct_vs_remapped() {
        let ids = [0, 1, 2];
        let direct = variable_to_domain_edges(&ids, AddressMode::Direct);
        assert_eq!(direct, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
        // Dense ids: both modes agree.
        assert_eq!(direct, variable_to_domain_edges(&ids, AddressMode::Remapped));

        // Remapped mode ignores the id values.
        let remapped = variable_to_domain_edges(&[7, 9], AddressMode::Remapped);
        assert_eq!(remapped, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_label_unsat_one_hot() {
        let cnf = Cnf::new(vec![Clause::new([1]), Clause::new([-1])], Label::Unsat).unwrap();
        for variant in [
            GraphVariant::Original,
            GraphVariant::SatSpecific,
            GraphVariant::Refactored,
        ] {
            assert_eq!(cnf.to_graph(variant).label_one_hot(), Some([1.0, 0.0]));
        }
    }
}
