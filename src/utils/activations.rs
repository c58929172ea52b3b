//! Activation functions for neural networks
//!
//! An activation is a scalar function paired with its derivative. Every layer
//! connection of a network shares the same pair, chosen once when the network
//! is built. The derivative is always evaluated at the pre-activation value
//! (the weighted sum plus bias), never at the activated output.
//!
//! Built-in pairs:
//! - Sigmoid: `1 / (1 + exp(-x))`, derivative `s * (1 - s)`
//! - Tanh: `tanh(x)`, derivative `1 - tanh(x)^2`
//! - Atan: `atan(x)`, derivative `1 / (1 + x^2)`

use std::fmt;
use std::str::FromStr;

use crate::error::NetworkError;

/// Strategy interface for an activation function and its derivative.
///
/// Implementations must be total over finite floats and must not panic.
pub trait ActivationFunction: Send + Sync {
    /// Apply the activation to a pre-activation value.
    fn apply(&self, x: f32) -> f32;

    /// Derivative of the activation evaluated at a pre-activation value.
    fn derivative(&self, x: f32) -> f32;

    /// Human readable name, used in logs.
    fn name(&self) -> &str;
}

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative at a pre-activation value.
///
/// Returns s * (1 - s) where s = sigmoid(x).
pub fn sigmoid_derivative(x: f32) -> f32 {
    let s = sigmoid(x);
    s * (1.0 - s)
}

/// Hyperbolic tangent derivative at a pre-activation value.
pub fn tanh_derivative(x: f32) -> f32 {
    let t = x.tanh();
    1.0 - t * t
}

/// Arctangent derivative at a pre-activation value.
pub fn atan_derivative(x: f32) -> f32 {
    1.0 / (x * x + 1.0)
}

/// Built-in activation pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
    Tanh,
    Atan,
}

impl Activation {
    /// Names accepted by [`Activation::from_str`].
    pub const NAMES: [&'static str; 3] = ["sigmoid", "tanh", "atan"];
}

impl ActivationFunction for Activation {
    fn apply(&self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Atan => x.atan(),
        }
    }

    fn derivative(&self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid_derivative(x),
            Activation::Tanh => tanh_derivative(x),
            Activation::Atan => atan_derivative(x),
        }
    }

    fn name(&self) -> &str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Atan => "atan",
        }
    }
}

impl FromStr for Activation {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "atan" => Ok(Activation::Atan),
            other => Err(NetworkError::Config(format!(
                "Invalid activation function '{}'. Must be one of: {}",
                other,
                Activation::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Activation built from a pair of plain function pointers.
///
/// ```
/// use neural_network::utils::activations::{ActivationFunction, FnActivation};
///
/// fn identity(x: f32) -> f32 { x }
/// fn one(_: f32) -> f32 { 1.0 }
///
/// let linear = FnActivation::new("linear", identity, one);
/// assert_eq!(linear.apply(3.0), 3.0);
/// assert_eq!(linear.derivative(3.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnActivation {
    name: &'static str,
    function: fn(f32) -> f32,
    derivative: fn(f32) -> f32,
}

impl FnActivation {
    pub fn new(name: &'static str, function: fn(f32) -> f32, derivative: fn(f32) -> f32) -> Self {
        Self {
            name,
            function,
            derivative,
        }
    }
}

impl ActivationFunction for FnActivation {
    fn apply(&self, x: f32) -> f32 {
        (self.function)(x)
    }

    fn derivative(&self, x: f32) -> f32 {
        (self.derivative)(x)
    }

    fn name(&self) -> &str {
        self.name
    }
}
