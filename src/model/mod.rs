#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
pub mod batch;
pub mod error;
pub mod hgt;
pub mod layers;
