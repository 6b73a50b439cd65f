#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
pub mod builder;
pub mod hetero;
pub mod schema;
