#![deny(missing_docs)]
//! This crate encodes CNF formulas as heterogeneous graphs and trains a
//! graph neural network to classify them as satisfiable or unsatisfiable.
//!
//! The pipeline has three stages:
//! 1. **Parse**: DIMACS CNF text into a [`sat::cnf::Cnf`], with the
//!    satisfiability label supplied explicitly or read from a validated
//!    file-name convention.
//! 2. **Encode**: a formula into one of three typed graph encodings
//!    ([`graph::schema::GraphVariant`]), all sharing a variable/value/
//!    operator/constraint node vocabulary and symmetrized `connected_to`
//!    relations.
//! 3. **Classify**: batched graphs through a typed message-passing model
//!    ([`model::hgt`]) with a trainable softmax head, driven by the
//!    hyperparameter sweep in [`train`].

/// The `sat` module holds the CNF data model and the DIMACS parser.
pub mod sat;

/// The `graph` module holds the heterogeneous graph artifact, its schema
/// vocabulary, and the three builder strategies.
pub mod graph;

/// The `model` module holds the typed message-passing classifier and graph
/// batching.
pub mod model;

/// The `train` module holds corpus loading, the training loop, and the
/// hyperparameter sweep.
pub mod train;
