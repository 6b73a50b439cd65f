//! The CNF formula data model.
//!
//! A [`Cnf`] owns an ordered sequence of clauses (input order preserved, so
//! graph construction is deterministic), the supervised satisfiability label,
//! and the derived variable index sets. It is immutable after construction:
//! graph builders borrow it and never mutate it.

use crate::graph::builder::build_graph;
use crate::graph::hetero::HeteroGraph;
use crate::graph::schema::GraphVariant;
use crate::sat::clause::{base_index, is_negative, Clause, Lit};
use crate::sat::error::ParseError;
use std::collections::BTreeSet;

/// Ground-truth satisfiability label for a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// The formula is satisfiable.
    Sat,
    /// The formula is unsatisfiable.
    Unsat,
}

impl Label {
    /// One-hot encoding: `[0, 1]` for satisfiable, `[1, 0]` for unsatisfiable.
    #[must_use]
    pub fn one_hot(self) -> [f32; 2] {
        match self {
            Self::Sat => [0.0, 1.0],
            Self::Unsat => [1.0, 0.0],
        }
    }

    /// `true` for [`Label::Sat`].
    #[must_use]
    pub fn is_sat(self) -> bool {
        matches!(self, Self::Sat)
    }
}

/// A CNF formula with its satisfiability label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    clauses: Vec<Clause>,
    label: Label,
    /// Sorted distinct signed literal values appearing anywhere in the formula.
    variables: Vec<Lit>,
    /// Sorted distinct zero-based base-variable indices.
    base_variables: Vec<usize>,
}

impl Cnf {
    /// Builds a formula from clauses and a label, deriving the variable sets.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::SparseVariables`] if the base-variable indices
    /// are not exactly `0..count`. Direct-mode domain edges address variable
    /// nodes by base-variable index, so gaps in the numbering would produce
    /// edges pointing past the variable node table.
    pub fn new(clauses: Vec<Clause>, label: Label) -> Result<Self, ParseError> {
        let mut variables = BTreeSet::new();
        let mut base_variables = BTreeSet::new();
        for clause in &clauses {
            for lit in clause.iter() {
                variables.insert(lit);
                base_variables.insert(base_index(lit));
            }
        }

        let base_variables: Vec<usize> = base_variables.into_iter().collect();
        if let Some(&highest) = base_variables.last() {
            if highest + 1 != base_variables.len() {
                return Err(ParseError::SparseVariables {
                    count: base_variables.len(),
                    highest,
                });
            }
        }

        Ok(Self {
            clauses,
            label,
            variables: variables.into_iter().collect(),
            base_variables,
        })
    }

    /// The clauses in input order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The satisfiability label.
    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    /// Sorted distinct signed literal values.
    #[must_use]
    pub fn variables(&self) -> &[Lit] {
        &self.variables
    }

    /// Sorted distinct zero-based base-variable indices.
    #[must_use]
    pub fn base_variables(&self) -> &[usize] {
        &self.base_variables
    }

    /// Number of clauses.
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Number of distinct base variables.
    #[must_use]
    pub fn num_base_variables(&self) -> usize {
        self.base_variables.len()
    }

    /// Total count of negative literal occurrences across all clauses.
    #[must_use]
    pub fn negative_occurrences(&self) -> usize {
        self.clauses
            .iter()
            .map(|c| c.iter().filter(|&l| is_negative(l)).count())
            .sum()
    }

    /// Builds the heterogeneous graph encoding for the given variant.
    ///
    /// Each call produces a fresh, independent graph; the formula itself is
    /// never mutated.
    #[must_use]
    pub fn to_graph(&self, variant: GraphVariant) -> HeteroGraph {
        build_graph(self, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Cnf {
        // {(1 v -2), (-1 v 2)}
        Cnf::new(
            vec![Clause::new([1, -2]), Clause::new([-1, 2])],
            Label::Sat,
        )
        .unwrap()
    }

    #[test]
    fn test_variable_sets() {
        let cnf = example();
        assert_eq!(cnf.variables(), &[-2, -1, 1, 2]);
        assert_eq!(cnf.base_variables(), &[0, 1]);
        assert!(cnf.base_variables().len() <= cnf.variables().len());
    }

    #[test]
    fn test_base_indices_in_range() {
        let cnf = example();
        let n = cnf.num_base_variables();
        for clause in cnf.clauses() {
            for lit in clause.iter() {
                assert!(crate::sat::clause::base_index(lit) < n);
            }
        }
    }

    #[test]
    fn test_negative_occurrences() {
        let cnf = example();
        assert_eq!(cnf.negative_occurrences(), 2);
    }

    #[test]
    fn test_one_hot_label() {
        assert_eq!(Label::Sat.one_hot(), [0.0, 1.0]);
        assert_eq!(Label::Unsat.one_hot(), [1.0, 0.0]);
    }

    #[test]
    fn test_sparse_variables_rejected() {
        // Variable 3 without 1 and 2 leaves gaps in the base indices.
        let result = Cnf::new(vec![Clause::new([3])], Label::Sat);
        assert!(matches!(
            result,
            Err(ParseError::SparseVariables {
                count: 1,
                highest: 2
            })
        ));
    }

    #[test]
    fn test_empty_formula_allowed_at_this_layer() {
        // The parser rejects empty inputs; the data model itself does not.
        let cnf = Cnf::new(vec![], Label::Unsat).unwrap();
        assert_eq!(cnf.num_clauses(), 0);
        assert_eq!(cnf.num_base_variables(), 0);
    }
}
