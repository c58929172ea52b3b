//! Error type shared by every fallible operation of the crate.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors reported by the network, its layers, the trainer and the config loader.
///
/// The first three variants are caller programming errors: they are detected
/// at the offending call and returned immediately, nothing is truncated or
/// padded to make the call succeed.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A signal or error vector does not match the width it is applied to.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Layer-size list is degenerate (fewer than two layers or a zero size)
    /// or layers do not chain.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Backward step requested without a matching forward step.
    #[error("state precondition violated: {0}")]
    StatePrecondition(String),

    /// Training parameters out of range (epochs, learning rate, empty dataset).
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// Configuration file parsed but failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetworkError {
    pub(crate) fn dimension(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Returns `true` for [`NetworkError::DimensionMismatch`].
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }

    /// Returns `true` for [`NetworkError::StatePrecondition`].
    pub fn is_state_precondition(&self) -> bool {
        matches!(self, Self::StatePrecondition(_))
    }

    /// Returns `true` for [`NetworkError::InvalidTopology`].
    pub fn is_invalid_topology(&self) -> bool {
        matches!(self, Self::InvalidTopology(_))
    }
}
