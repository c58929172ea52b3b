//! Network topology
//!
//! A topology is the ordered list of layer sizes: the input layer, zero or
//! more hidden layers and the output layer. It fixes the number and shape of
//! the layer connections and never changes after the network is built.

use std::fmt;

use serde::Deserialize;

use crate::error::{NetworkError, Result};

/// Validated ordered list of layer sizes.
///
/// # Example
///
/// ```
/// use neural_network::architecture::Topology;
///
/// let topology = Topology::new(4, &[3, 4], 2).unwrap();
/// assert_eq!(topology.sizes(), &[4, 3, 4, 2]);
/// assert_eq!(topology.connection_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<usize>")]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    /// Build from the input size, hidden layer sizes and output size.
    pub fn new(input: usize, hidden: &[usize], output: usize) -> Result<Self> {
        let mut sizes = Vec::with_capacity(hidden.len() + 2);
        sizes.push(input);
        sizes.extend_from_slice(hidden);
        sizes.push(output);
        Self::from_sizes(sizes)
    }

    /// Build from a flat list of layer sizes.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidTopology`] if there are fewer than two layers
    /// or any layer is empty.
    pub fn from_sizes(sizes: impl Into<Vec<usize>>) -> Result<Self> {
        let sizes = sizes.into();
        validate_sizes(&sizes)?;
        Ok(Self { sizes })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn input_size(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Sizes between the input and output layers.
    pub fn hidden_sizes(&self) -> &[usize] {
        &self.sizes[1..self.sizes.len() - 1]
    }

    pub fn layer_count(&self) -> usize {
        self.sizes.len()
    }

    /// Number of layer connections, one per adjacent pair of layers.
    pub fn connection_count(&self) -> usize {
        self.sizes.len() - 1
    }

    /// `(source, destination)` size of each connection, input side first.
    pub fn connections(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.sizes.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Total weights and biases a network of this shape holds.
    pub fn parameter_count(&self) -> usize {
        self.connections().map(|(src, dst)| src * dst + dst).sum()
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = NetworkError;

    fn try_from(sizes: Vec<usize>) -> Result<Self> {
        Self::from_sizes(sizes)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<String> = self.sizes.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", sizes.join(", "))
    }
}

fn validate_sizes(sizes: &[usize]) -> Result<()> {
    if sizes.len() < 2 {
        return Err(NetworkError::InvalidTopology(format!(
            "need at least an input and an output layer, got {} layer(s)",
            sizes.len()
        )));
    }

    if let Some(index) = sizes.iter().position(|&size| size == 0) {
        return Err(NetworkError::InvalidTopology(format!(
            "Layer {}: size must be greater than 0",
            index
        )));
    }

    Ok(())
}
