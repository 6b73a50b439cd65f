//! Corpus loading and splitting.
//!
//! A [`Dataset`] is a flat list of labeled graphs built from a directory of
//! DIMACS files. Every graph in a dataset shares one builder variant, so any
//! slice of it can be batched without a schema check per graph. Construction
//! is independent per file and runs in parallel.

use crate::graph::hetero::HeteroGraph;
use crate::graph::schema::GraphVariant;
use crate::model::batch::GraphBatch;
use crate::model::error::Result as ModelResult;
use crate::sat::cnf::Label;
use crate::sat::dimacs::{collect_cnf_files, parse_file, parse_file_with_convention};
use crate::sat::error::Result;
use rayon::prelude::*;
use std::path::Path;

/// Where the satisfiability label of a corpus file comes from.
#[derive(Debug, Clone, Copy)]
pub enum LabelSource {
    /// Read the label character at a fixed position from the end of the file
    /// name (the naming scheme of the benchmark corpora).
    Filename {
        /// Character position counted from the end of the name.
        position: usize,
    },
    /// Assign the same label to every file, for corpora sorted into
    /// all-satisfiable or all-unsatisfiable directories.
    Fixed(Label),
}

/// An ordered collection of labeled graphs sharing one variant.
#[derive(Debug, Clone)]
pub struct Dataset {
    graphs: Vec<HeteroGraph>,
    variant: GraphVariant,
}

impl Dataset {
    /// Wraps pre-built graphs. The caller guarantees they share `variant`;
    /// a stray graph of another variant is caught later, at batching.
    #[must_use]
    pub fn from_graphs(graphs: Vec<HeteroGraph>, variant: GraphVariant) -> Self {
        Self { graphs, variant }
    }

    /// Recursively loads every `.cnf` file under `dir` and builds its graph.
    ///
    /// Files run in parallel; a file that fails to parse is logged at `warn`
    /// and skipped, so one malformed input never poisons the rest of the
    /// corpus.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::sat::error::ParseError`] only if the directory walk
    /// itself fails.
    pub fn load_dir(
        dir: impl AsRef<Path>,
        variant: GraphVariant,
        source: LabelSource,
    ) -> Result<Self> {
        let files = collect_cnf_files(dir)?;
        let graphs: Vec<HeteroGraph> = files
            .par_iter()
            .filter_map(|path| {
                let parsed = match source {
                    LabelSource::Filename { position } => {
                        parse_file_with_convention(path, position)
                    }
                    LabelSource::Fixed(label) => parse_file(path, label),
                };
                match parsed {
                    Ok(cnf) => Some(cnf.to_graph(variant)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping file");
                        None
                    }
                }
            })
            .collect();

        tracing::info!(
            files = files.len(),
            graphs = graphs.len(),
            %variant,
            "corpus loaded"
        );
        Ok(Self { graphs, variant })
    }

    /// The variant all member graphs share.
    #[must_use]
    pub fn variant(&self) -> GraphVariant {
        self.variant
    }

    /// Number of graphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// `true` if the dataset holds no graphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Seeded in-place shuffle. The same seed yields the same order.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = fastrand::Rng::with_seed(seed);
        rng.shuffle(&mut self.graphs);
    }

    /// Splits off the first `n` graphs; `self` keeps the remainder.
    ///
    /// # Panics
    ///
    /// If `n` exceeds the dataset length.
    #[must_use]
    pub fn split_at(mut self, n: usize) -> (Self, Self) {
        let rest = self.graphs.split_off(n);
        let variant = self.variant;
        (self, Self::from_graphs(rest, variant))
    }

    /// Merges the graphs into fixed-size batches (the last one may be short).
    ///
    /// # Errors
    ///
    /// Propagates batching errors, e.g. a mixed-variant dataset built through
    /// [`Dataset::from_graphs`] with inconsistent inputs.
    pub fn batches(&self, size: usize) -> ModelResult<Vec<GraphBatch>> {
        self.graphs
            .chunks(size.max(1))
            .map(GraphBatch::from_graphs)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use crate::sat::cnf::Cnf;
    use std::fs;

    fn graph(label: Label) -> HeteroGraph {
        Cnf::new(vec![Clause::new([1, -2]), Clause::new([-1, 2])], label)
            .unwrap()
            .to_graph(GraphVariant::Refactored)
    }

    #[test]
    fn test_split_preserves_order_and_variant() {
        let dataset = Dataset::from_graphs(
            vec![graph(Label::Sat), graph(Label::Unsat), graph(Label::Sat)],
            GraphVariant::Refactored,
        );
        let (head, tail) = dataset.split_at(2);
        assert_eq!(head.len(), 2);
        assert_eq!(tail.len(), 1);
        assert_eq!(head.variant(), GraphVariant::Refactored);
        assert_eq!(tail.variant(), GraphVariant::Refactored);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let graphs: Vec<_> = (0..8)
            .map(|i| graph(if i % 2 == 0 { Label::Sat } else { Label::Unsat }))
            .collect();
        let mut a = Dataset::from_graphs(graphs.clone(), GraphVariant::Refactored);
        let mut b = Dataset::from_graphs(graphs, GraphVariant::Refactored);
        a.shuffle(99);
        b.shuffle(99);
        let labels = |d: &Dataset| -> Vec<_> {
            d.graphs.iter().map(HeteroGraph::label_one_hot).collect()
        };
        assert_eq!(labels(&a), labels(&b));
    }

    #[test]
    fn test_batches_chunking() {
        let dataset = Dataset::from_graphs(
            vec![graph(Label::Sat); 5],
            GraphVariant::Refactored,
        );
        let batches = dataset.batches(2).unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].num_samples(), 2);
        assert_eq!(batches[2].num_samples(), 1);
    }

    #[test]
    fn test_empty_dataset_has_no_batches() {
        let dataset = Dataset::from_graphs(vec![], GraphVariant::Original);
        assert!(dataset.is_empty());
        assert!(dataset.batches(4).unwrap().is_empty());
    }

    #[test]
    fn test_load_dir_with_filename_labels() {
        let dir = std::env::temp_dir().join(format!("cnf-corpus-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("uf3-01-sat=1.00.cnf"), "p cnf 2 2\n1 -2 0\n-1 2 0\n").unwrap();
        fs::write(dir.join("uuf3-01-sat=0.00.cnf"), "p cnf 1 2\n1 0\n-1 0\n").unwrap();
        // Malformed content is skipped, not fatal.
        fs::write(dir.join("bad-file-sat=1.00.cnf"), "1 abc 0\n").unwrap();

        let dataset = Dataset::load_dir(
            &dir,
            GraphVariant::Refactored,
            LabelSource::Filename {
                position: crate::sat::dimacs::CORPUS_LABEL_POSITION,
            },
        )
        .unwrap();
        assert_eq!(dataset.len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
