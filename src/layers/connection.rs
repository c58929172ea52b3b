//! Weighted connection between two adjacent layers
//!
//! A [`LayerConnection`] owns the weight matrix and bias vector linking a
//! source layer of N neurons to a destination layer of M neurons and performs
//! the transformation `output = f(input × weights + bias)`.
//!
//! The forward step is a pure function of the input. Everything the backward
//! step needs is returned to the caller as a [`ForwardState`], which is handed
//! back to [`LayerConnection::backward`] explicitly.

use std::fmt;
use std::sync::Arc;

use crate::error::{NetworkError, Result};
use crate::utils::{ActivationFunction, SimpleRng};

/// Symmetric range of the initial weights and biases.
pub const INIT_RANGE: f32 = 0.5;

/// Values captured by one [`LayerConnection::forward`] call.
///
/// Only meaningful for the connection that produced it and only until that
/// connection's parameters change.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardState {
    input: Vec<f32>,
    pre_activation: Vec<f32>,
    output: Vec<f32>,
}

impl ForwardState {
    /// Input signal of the forward call.
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    /// Weighted sum plus bias at each destination neuron.
    pub fn pre_activation(&self) -> &[f32] {
        &self.pre_activation
    }

    /// Activated output at each destination neuron.
    pub fn output(&self) -> &[f32] {
        &self.output
    }
}

/// Fully connected weights between two layers.
///
/// # Fields
///
/// * `source_size` - Number of neurons in the source layer
/// * `destination_size` - Number of neurons in the destination layer
/// * `weights` - Row-major `source_size × destination_size` matrix
/// * `bias` - One shift per destination neuron
/// * `activation` - Activation pair shared with the rest of the network
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use neural_network::layers::LayerConnection;
/// use neural_network::utils::{Activation, SimpleRng};
///
/// let mut rng = SimpleRng::new(42);
/// let layer = LayerConnection::new(4, 3, Arc::new(Activation::Sigmoid), &mut rng).unwrap();
/// let (output, state) = layer.forward(&[1.0, 0.0, 0.0, 1.0]).unwrap();
/// assert_eq!(output.len(), 3);
/// assert_eq!(state.input(), &[1.0, 0.0, 0.0, 1.0]);
/// ```
#[derive(Clone)]
pub struct LayerConnection {
    source_size: usize,
    destination_size: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
    activation: Arc<dyn ActivationFunction>,
}

impl LayerConnection {
    /// Create a connection with weights and bias drawn uniformly from
    /// `[-INIT_RANGE, INIT_RANGE]`.
    ///
    /// Weights are drawn row by row (source neuron major), then the bias.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidTopology`] if either size is zero.
    pub fn new(
        source_size: usize,
        destination_size: usize,
        activation: Arc<dyn ActivationFunction>,
        rng: &mut SimpleRng,
    ) -> Result<Self> {
        if source_size == 0 || destination_size == 0 {
            return Err(NetworkError::InvalidTopology(format!(
                "layer connection {}x{} has an empty side",
                source_size, destination_size
            )));
        }

        let mut weights = vec![0.0f32; source_size * destination_size];
        for value in &mut weights {
            *value = rng.gen_range_f32(-INIT_RANGE, INIT_RANGE);
        }
        let mut bias = vec![0.0f32; destination_size];
        for value in &mut bias {
            *value = rng.gen_range_f32(-INIT_RANGE, INIT_RANGE);
        }

        Ok(Self {
            source_size,
            destination_size,
            weights,
            bias,
            activation,
        })
    }

    /// Create a connection from explicit parameters.
    ///
    /// `weights[i][j]` is the weight from source neuron `i` to destination
    /// neuron `j`; `bias` has one entry per destination neuron.
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidTopology`] for an empty matrix and
    /// [`NetworkError::DimensionMismatch`] for ragged rows or a bias of the
    /// wrong length.
    pub fn with_parameters(
        weights: &[Vec<f32>],
        bias: Vec<f32>,
        activation: Arc<dyn ActivationFunction>,
    ) -> Result<Self> {
        let source_size = weights.len();
        let destination_size = weights.first().map_or(0, Vec::len);
        if source_size == 0 || destination_size == 0 {
            return Err(NetworkError::InvalidTopology(
                "weight matrix must have at least one row and one column".to_string(),
            ));
        }

        let mut layer = Self {
            source_size,
            destination_size,
            weights: vec![0.0f32; source_size * destination_size],
            bias: vec![0.0f32; destination_size],
            activation,
        };
        layer.set_weights(weights)?;
        layer.set_bias(bias)?;
        Ok(layer)
    }

    /// Replace the weight matrix, keeping the connection's dimensions.
    pub fn set_weights(&mut self, weights: &[Vec<f32>]) -> Result<()> {
        if weights.len() != self.source_size {
            return Err(NetworkError::dimension(
                "weight rows",
                self.source_size,
                weights.len(),
            ));
        }
        for row in weights {
            if row.len() != self.destination_size {
                return Err(NetworkError::dimension(
                    "weight columns",
                    self.destination_size,
                    row.len(),
                ));
            }
        }

        for (dst, row) in self
            .weights
            .chunks_exact_mut(self.destination_size)
            .zip(weights)
        {
            dst.copy_from_slice(row);
        }
        Ok(())
    }

    /// Replace the bias vector.
    pub fn set_bias(&mut self, bias: Vec<f32>) -> Result<()> {
        if bias.len() != self.destination_size {
            return Err(NetworkError::dimension(
                "bias",
                self.destination_size,
                bias.len(),
            ));
        }
        self.bias = bias;
        Ok(())
    }

    /// Number of neurons feeding this connection.
    pub fn source_size(&self) -> usize {
        self.source_size
    }

    /// Number of neurons this connection feeds.
    pub fn destination_size(&self) -> usize {
        self.destination_size
    }

    /// Weight from source neuron `source` to destination neuron `destination`.
    pub fn weight(&self, source: usize, destination: usize) -> Option<f32> {
        if source >= self.source_size || destination >= self.destination_size {
            return None;
        }
        self.weights
            .get(source * self.destination_size + destination)
            .copied()
    }

    /// Weight matrix, row-major, `source_size × destination_size`.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    pub fn activation(&self) -> &Arc<dyn ActivationFunction> {
        &self.activation
    }

    /// Returns source_size × destination_size (weights) + destination_size (bias).
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    /// Forward propagation through the connection.
    ///
    /// For each destination neuron `j`:
    /// `pre[j] = bias[j] + Σ_i weight[i][j] * input[i]` and `out[j] = f(pre[j])`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::DimensionMismatch`] if `input.len() != source_size`.
    pub fn forward(&self, input: &[f32]) -> Result<(Vec<f32>, ForwardState)> {
        if input.len() != self.source_size {
            return Err(NetworkError::dimension(
                "layer input",
                self.source_size,
                input.len(),
            ));
        }

        let mut pre_activation = self.bias.clone();
        for (&signal, row) in input
            .iter()
            .zip(self.weights.chunks_exact(self.destination_size))
        {
            for (sum, &weight) in pre_activation.iter_mut().zip(row) {
                *sum += weight * signal;
            }
        }

        let output: Vec<f32> = pre_activation
            .iter()
            .map(|&z| self.activation.apply(z))
            .collect();

        let state = ForwardState {
            input: input.to_vec(),
            pre_activation,
            output: output.clone(),
        };
        Ok((output, state))
    }

    /// Backward propagation through the connection, updating parameters in place.
    ///
    /// 1. `grad[j] = destination_error[j] * f'(pre[j])`
    /// 2. `source_error[i] = Σ_j weight[i][j] * grad[j]`, using the weights
    ///    before this update
    /// 3. `weight[i][j] += learning_rate * grad[j] * input[i]`
    /// 4. `bias[j] += learning_rate * grad[j]`
    ///
    /// `destination_error` points in the direction the output should move
    /// (`expected - actual` at the output layer), so the additive update
    /// descends the squared error.
    ///
    /// Returns the error attributed to the source layer.
    ///
    /// # Errors
    ///
    /// * [`NetworkError::StatePrecondition`] if `state` was not produced by a
    ///   connection of this shape.
    /// * [`NetworkError::DimensionMismatch`] if
    ///   `destination_error.len() != destination_size`.
    pub fn backward(
        &mut self,
        state: &ForwardState,
        destination_error: &[f32],
        learning_rate: f32,
    ) -> Result<Vec<f32>> {
        if state.input.len() != self.source_size
            || state.pre_activation.len() != self.destination_size
        {
            return Err(NetworkError::StatePrecondition(format!(
                "forward state of shape {}x{} does not belong to a {}x{} connection",
                state.input.len(),
                state.pre_activation.len(),
                self.source_size,
                self.destination_size
            )));
        }
        if destination_error.len() != self.destination_size {
            return Err(NetworkError::dimension(
                "destination error",
                self.destination_size,
                destination_error.len(),
            ));
        }

        let gradient: Vec<f32> = destination_error
            .iter()
            .zip(&state.pre_activation)
            .map(|(&error, &z)| error * self.activation.derivative(z))
            .collect();

        let source_error: Vec<f32> = self
            .weights
            .chunks_exact(self.destination_size)
            .map(|row| row.iter().zip(&gradient).map(|(w, g)| w * g).sum::<f32>())
            .collect();

        for (&signal, row) in state
            .input
            .iter()
            .zip(self.weights.chunks_exact_mut(self.destination_size))
        {
            for (weight, &grad) in row.iter_mut().zip(&gradient) {
                *weight += learning_rate * grad * signal;
            }
        }
        for (bias, &grad) in self.bias.iter_mut().zip(&gradient) {
            *bias += learning_rate * grad;
        }

        Ok(source_error)
    }
}

impl fmt::Debug for LayerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerConnection")
            .field("source_size", &self.source_size)
            .field("destination_size", &self.destination_size)
            .field("activation", &self.activation.name())
            .field("weights", &self.weights)
            .field("bias", &self.bias)
            .finish()
    }
}
