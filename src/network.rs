//! Feedforward network built from a chain of layer connections
//!
//! Inference flows input → output through every [`LayerConnection`]; training
//! flows the error output → input through the same connections in reverse,
//! each visited exactly once per pass.
//!
//! Two equivalent ways to train are offered:
//!
//! - the explicit pair [`Network::forward_pass`] / [`Network::backward_pass`],
//!   where the caller holds the [`ForwardPass`] record;
//! - the step pair [`Network::feed_forward`] / [`Network::back_propagation`],
//!   where the network keeps the record of the most recent forward pass until
//!   the matching backward pass consumes it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::architecture::Topology;
use crate::error::{NetworkError, Result};
use crate::layers::{ForwardState, LayerConnection};
use crate::trainer::{Trainer, TrainingExample};
use crate::utils::{ActivationFunction, SimpleRng};

static NEXT_NETWORK_ID: AtomicU64 = AtomicU64::new(0);

fn next_network_id() -> u64 {
    NEXT_NETWORK_ID.fetch_add(1, Ordering::Relaxed)
}

/// States of every connection for one input, input side first.
///
/// A pass is tied to the network that produced it and to the parameters it
/// saw: once that network updates any connection, the pass is stale.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPass {
    states: Vec<ForwardState>,
    output: Vec<f32>,
    network_id: u64,
    generation: u64,
}

impl ForwardPass {
    /// Output of the last connection.
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    pub fn states(&self) -> &[ForwardState] {
        &self.states
    }

    pub fn into_output(self) -> Vec<f32> {
        self.output
    }
}

/// Feedforward neural network.
///
/// # Example
///
/// ```
/// use neural_network::{Activation, Network};
///
/// let mut network = Network::from_sizes(&[2, 3, 1], Activation::Tanh, 7).unwrap();
/// let output = network.feed_forward(&[0.5, -0.5]).unwrap();
/// let error = network.back_propagation(&[0.25], &output, 0.1).unwrap();
/// assert_eq!(error.len(), 1);
/// ```
pub struct Network {
    topology: Topology,
    layers: Vec<LayerConnection>,
    activation: Arc<dyn ActivationFunction>,
    pending: Option<ForwardPass>,
    id: u64,
    // Bumped whenever parameters may have changed.
    generation: u64,
}

impl Network {
    /// Build a network whose parameters are drawn from `rng`.
    ///
    /// Connections are initialized input side first.
    pub fn new<A>(topology: Topology, activation: A, rng: &mut SimpleRng) -> Result<Self>
    where
        A: ActivationFunction + 'static,
    {
        Self::with_shared_activation(topology, Arc::new(activation), rng)
    }

    /// Build a network with a fresh generator seeded with `seed`.
    pub fn with_seed<A>(topology: Topology, activation: A, seed: u64) -> Result<Self>
    where
        A: ActivationFunction + 'static,
    {
        let mut rng = SimpleRng::new(seed);
        Self::new(topology, activation, &mut rng)
    }

    /// Build a network from a flat list of layer sizes.
    pub fn from_sizes<A>(sizes: &[usize], activation: A, seed: u64) -> Result<Self>
    where
        A: ActivationFunction + 'static,
    {
        Self::with_seed(Topology::from_sizes(sizes)?, activation, seed)
    }

    /// Build a network sharing an existing activation handle.
    pub fn with_shared_activation(
        topology: Topology,
        activation: Arc<dyn ActivationFunction>,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        let layers = topology
            .connections()
            .map(|(src, dst)| LayerConnection::new(src, dst, Arc::clone(&activation), rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            topology,
            layers,
            activation,
            pending: None,
            id: next_network_id(),
            generation: 0,
        })
    }

    /// Assemble a network from pre-built connections, e.g. with injected weights.
    ///
    /// The activation of the first connection becomes the network activation.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidTopology`] if `layers` is empty or adjacent
    /// connections do not chain.
    pub fn from_layers(layers: Vec<LayerConnection>) -> Result<Self> {
        let first = layers.first().ok_or_else(|| {
            NetworkError::InvalidTopology("network needs at least one connection".to_string())
        })?;
        let activation = Arc::clone(first.activation());

        let mut sizes = vec![first.source_size()];
        for (index, layer) in layers.iter().enumerate() {
            let previous = sizes[sizes.len() - 1];
            if layer.source_size() != previous {
                return Err(NetworkError::InvalidTopology(format!(
                    "Layer connection mismatch: connection {} expects {} inputs but the previous layer has {}",
                    index,
                    layer.source_size(),
                    previous
                )));
            }
            sizes.push(layer.destination_size());
        }

        Ok(Self {
            topology: Topology::from_sizes(sizes)?,
            layers,
            activation,
            pending: None,
            id: next_network_id(),
            generation: 0,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn layers(&self) -> &[LayerConnection] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LayerConnection> {
        self.layers.get(index)
    }

    /// Mutable access to a connection. Discards any pending forward pass,
    /// since its states may no longer match the parameters.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut LayerConnection> {
        self.pending = None;
        self.generation += 1;
        self.layers.get_mut(index)
    }

    pub fn activation(&self) -> &Arc<dyn ActivationFunction> {
        &self.activation
    }

    pub fn input_size(&self) -> usize {
        self.topology.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.topology.output_size()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(LayerConnection::parameter_count).sum()
    }

    /// Whether a forward pass is waiting for its backward pass.
    pub fn has_pending_pass(&self) -> bool {
        self.pending.is_some()
    }

    /// Forward pass that records every connection's state without touching
    /// the network.
    ///
    /// # Errors
    ///
    /// [`NetworkError::DimensionMismatch`] if `input.len()` differs from the
    /// input layer size.
    pub fn forward_pass(&self, input: &[f32]) -> Result<ForwardPass> {
        if input.len() != self.input_size() {
            return Err(NetworkError::dimension(
                "network input",
                self.input_size(),
                input.len(),
            ));
        }

        let mut states = Vec::with_capacity(self.layers.len());
        let mut signal = input.to_vec();
        for layer in &self.layers {
            let (output, state) = layer.forward(&signal)?;
            states.push(state);
            signal = output;
        }

        Ok(ForwardPass {
            states,
            output: signal,
            network_id: self.id,
            generation: self.generation,
        })
    }

    /// Inference only. Leaves any pending forward pass untouched.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        Ok(self.forward_pass(input)?.into_output())
    }

    /// Backward pass for a [`ForwardPass`] produced by this network with its
    /// current parameters.
    ///
    /// The output error is `expected - pass.output()`. Returns that error
    /// (before any parameter update).
    ///
    /// # Errors
    ///
    /// * [`NetworkError::DimensionMismatch`] if `expected` does not match the
    ///   output layer size.
    /// * [`NetworkError::StatePrecondition`] if `pass` came from another
    ///   network or is stale: a pass admits at most one backward pass, and
    ///   none once the parameters changed after it was taken.
    pub fn backward_pass(
        &mut self,
        pass: &ForwardPass,
        expected: &[f32],
        learning_rate: f32,
    ) -> Result<Vec<f32>> {
        if expected.len() != self.output_size() {
            return Err(NetworkError::dimension(
                "expected output",
                self.output_size(),
                expected.len(),
            ));
        }
        self.check_pass(pass)?;

        let output_error: Vec<f32> = expected
            .iter()
            .zip(&pass.output)
            .map(|(e, a)| e - a)
            .collect();
        self.propagate(&pass.states, output_error.clone(), learning_rate)?;
        Ok(output_error)
    }

    /// Run the input through every connection and keep the pass for the next
    /// [`Network::back_propagation`]. A later call replaces the kept pass.
    pub fn feed_forward(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let pass = self.forward_pass(input)?;
        let output = pass.output.clone();
        self.pending = Some(pass);
        Ok(output)
    }

    /// Backward pass for the most recent [`Network::feed_forward`].
    ///
    /// The output error is `expected - actual`, where `actual` is normally
    /// the value `feed_forward` returned. Connections are updated from the
    /// output side back to the input side. The kept forward pass is consumed,
    /// so each `feed_forward` admits exactly one `back_propagation`.
    ///
    /// Returns the output error (before any parameter update).
    ///
    /// # Errors
    ///
    /// * [`NetworkError::DimensionMismatch`] if `expected` or `actual` do not
    ///   match the output layer size. The kept pass survives this error.
    /// * [`NetworkError::StatePrecondition`] if there is no kept pass.
    pub fn back_propagation(
        &mut self,
        expected: &[f32],
        actual: &[f32],
        learning_rate: f32,
    ) -> Result<Vec<f32>> {
        let output_size = self.output_size();
        if expected.len() != output_size {
            return Err(NetworkError::dimension(
                "expected output",
                output_size,
                expected.len(),
            ));
        }
        if actual.len() != output_size {
            return Err(NetworkError::dimension(
                "actual output",
                output_size,
                actual.len(),
            ));
        }

        let pass = self.pending.take().ok_or_else(|| {
            NetworkError::StatePrecondition(
                "back_propagation requires a preceding feed_forward".to_string(),
            )
        })?;

        let output_error: Vec<f32> = expected.iter().zip(actual).map(|(e, a)| e - a).collect();
        self.propagate(&pass.states, output_error.clone(), learning_rate)?;
        Ok(output_error)
    }

    /// Train on `dataset` for `epochs` epochs at a fixed learning rate.
    ///
    /// Returns the squared output error per output neuron summed over every
    /// presented example and divided by `epochs`. See [`Trainer`] for
    /// shuffling and learning rate schedules.
    pub fn learn(
        &mut self,
        dataset: &[TrainingExample],
        epochs: usize,
        learning_rate: f32,
    ) -> Result<Vec<f32>> {
        Trainer::new(epochs, learning_rate).fit(self, dataset)
    }

    fn check_pass(&self, pass: &ForwardPass) -> Result<()> {
        if pass.network_id != self.id {
            return Err(NetworkError::StatePrecondition(
                "forward pass was produced by another network".to_string(),
            ));
        }
        if pass.generation != self.generation {
            return Err(NetworkError::StatePrecondition(format!(
                "forward pass is stale: taken at parameter generation {}, network is at {}",
                pass.generation, self.generation
            )));
        }
        if pass.states.len() != self.layers.len() {
            return Err(NetworkError::StatePrecondition(format!(
                "forward pass covers {} connections, network has {}",
                pass.states.len(),
                self.layers.len()
            )));
        }
        for (index, (layer, state)) in self.layers.iter().zip(&pass.states).enumerate() {
            if state.input().len() != layer.source_size()
                || state.pre_activation().len() != layer.destination_size()
            {
                return Err(NetworkError::StatePrecondition(format!(
                    "forward pass state {} does not match connection {}x{}",
                    index,
                    layer.source_size(),
                    layer.destination_size()
                )));
            }
        }
        Ok(())
    }

    fn propagate(
        &mut self,
        states: &[ForwardState],
        output_error: Vec<f32>,
        learning_rate: f32,
    ) -> Result<()> {
        self.generation += 1;
        let mut error = output_error;
        for (index, (layer, state)) in self.layers.iter_mut().zip(states).enumerate().rev() {
            error = layer.backward(state, &error, learning_rate)?;
            trace!(layer = index, "connection updated");
        }
        Ok(())
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("topology", &self.topology)
            .field("activation", &self.activation.name())
            .field("layers", &self.layers)
            .field("pending", &self.pending.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}
