//! Shared utilities for the network
//!
//! Random number generation, activation functions and learning rate schedules.

pub mod activations;
pub mod lr_scheduler;
pub mod rng;

pub use activations::{Activation, ActivationFunction, FnActivation};
pub use lr_scheduler::{Constant, ExponentialDecay, LRScheduler, StepDecay};
pub use rng::SimpleRng;
