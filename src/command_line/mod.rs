#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
pub(crate) mod cli;
