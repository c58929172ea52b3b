//! Feedforward neural network engine
//!
//! A stack of weighted layer connections that maps an input signal vector to
//! an output vector, and a backpropagation procedure that adjusts weights and
//! biases by gradient descent on the squared output error.
//!
//! # Modules
//!
//! - `layers`: `LayerConnection` and its explicit forward state
//! - `network`: `Network`, full forward and backward passes
//! - `trainer`: epoch loop over labeled examples
//! - `architecture`: validated layer-size topology
//! - `config`: JSON training configuration
//! - `utils`: activation functions, RNG, learning rate schedulers
//! - `error`: `NetworkError` and the crate `Result`
//!
//! # Example
//!
//! ```
//! use neural_network::{Activation, Network, TrainingExample};
//!
//! let mut network = Network::from_sizes(&[2, 3, 1], Activation::Sigmoid, 42).unwrap();
//! let dataset = vec![
//!     TrainingExample::new(vec![1.0, 0.0], vec![1.0]),
//!     TrainingExample::new(vec![0.0, 1.0], vec![0.0]),
//! ];
//! let average_error = network.learn(&dataset, 20, 0.5).unwrap();
//! assert_eq!(average_error.len(), 1);
//! ```

pub mod architecture;
pub mod config;
pub mod error;
pub mod layers;
pub mod network;
pub mod trainer;
pub mod utils;

pub use architecture::Topology;
pub use error::{NetworkError, Result};
pub use layers::{ForwardState, LayerConnection};
pub use network::{ForwardPass, Network};
pub use trainer::{EpochStats, Trainer, TrainingExample};
pub use utils::{Activation, ActivationFunction, FnActivation, SimpleRng};
