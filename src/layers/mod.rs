//! Layer connections
//!
//! A network of L layers is a chain of L - 1 [`LayerConnection`]s, each owning
//! the weights between two adjacent layers.

pub mod connection;

pub use connection::{ForwardState, LayerConnection};
