//! A single disjunction of literals.
//!
//! A clause is a *set* of signed integer literals: duplicates collapse and
//! iteration order is the sorted literal order, which keeps every downstream
//! graph construction deterministic.

use smallvec::SmallVec;

/// A signed literal. The sign encodes polarity; `|lit| - 1` is the zero-based
/// base-variable index.
pub type Lit = i32;

/// A disjunction of literals.
///
/// Literals are stored sorted and deduplicated. Most clauses in the corpora
/// this crate targets are short, so the backing storage is a
/// `SmallVec<[Lit; 8]>` and stays inline for clauses of up to 8 literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: SmallVec<[Lit; 8]>,
}

impl Clause {
    /// Creates a clause from raw literals, collapsing duplicates and sorting.
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Lit>) -> Self {
        let mut literals: SmallVec<[Lit; 8]> = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    /// Number of distinct literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// `true` if the clause holds no literals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Iterates literals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Lit> + '_ {
        self.literals.iter().copied()
    }

    /// `true` if `lit` occurs in the clause.
    #[must_use]
    pub fn contains(&self, lit: Lit) -> bool {
        self.literals.binary_search(&lit).is_ok()
    }
}

/// Zero-based base-variable index underlying a literal.
#[must_use]
pub fn base_index(lit: Lit) -> usize {
    (lit.unsigned_abs() as usize) - 1
}

/// `true` if the literal is a negated occurrence.
#[must_use]
pub fn is_negative(lit: Lit) -> bool {
    lit < 0
}

impl From<Vec<Lit>> for Clause {
    fn from(literals: Vec<Lit>) -> Self {
        Self::new(literals)
    }
}

impl From<&[Lit]> for Clause {
    fn from(literals: &[Lit]) -> Self {
        Self::new(literals.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_and_dedups() {
        let clause = Clause::new([3, -1, 3, 2]);
        assert_eq!(clause.len(), 3);
        let lits: Vec<Lit> = clause.iter().collect();
        assert_eq!(lits, vec![-1, 2, 3]);
    }

    #[test]
    fn test_contains() {
        let clause = Clause::new([1, -2]);
        assert!(clause.contains(-2));
        assert!(clause.contains(1));
        assert!(!clause.contains(2));
    }

    #[test]
    fn test_base_index() {
        assert_eq!(base_index(1), 0);
        assert_eq!(base_index(-1), 0);
        assert_eq!(base_index(-7), 6);
    }

    #[test]
    fn test_polarity() {
        assert!(is_negative(-4));
        assert!(!is_negative(4));
    }

    #[test]
    fn test_empty() {
        let clause = Clause::new([]);
        assert!(clause.is_empty());
    }
}
