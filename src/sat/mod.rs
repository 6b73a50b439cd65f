#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod error;
