//! Training configuration
//!
//! A JSON document describing the network shape, the activation and the
//! training loop, so experiments can change without code changes.
//!
//! Scheduler types require different optional fields:
//!
//! - **constant** (default): no extra fields
//! - **step_decay**: requires `step_size` and `gamma`
//! - **exponential**: requires `decay_rate`
//!
//! `gamma` and `decay_rate` lie in (0, 1], so a schedule only ever decays.
//!
//! # Example
//!
//! ```json
//! {
//!   "topology": [4, 3, 4, 2],
//!   "activation": "tanh",
//!   "epochs": 10,
//!   "learning_rate": 1.0,
//!   "seed": 42,
//!   "scheduler_type": "step_decay",
//!   "step_size": 5,
//!   "gamma": 0.5
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::architecture::Topology;
use crate::error::{NetworkError, Result};
use crate::network::Network;
use crate::trainer::Trainer;
use crate::utils::{Activation, Constant, ExponentialDecay, LRScheduler, SimpleRng, StepDecay};

/// Seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 42;

const SCHEDULER_TYPES: [&str; 3] = ["constant", "step_decay", "exponential"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    /// Layer sizes, input first.
    pub topology: Vec<usize>,

    /// "sigmoid" (default), "tanh" or "atan"
    #[serde(default)]
    pub activation: Option<String>,

    pub epochs: usize,

    /// Initial learning rate.
    pub learning_rate: f32,

    /// Seed for weight initialization and shuffling.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Reorder examples every epoch (default false).
    #[serde(default)]
    pub shuffle: Option<bool>,

    /// "constant", "step_decay" or "exponential"
    #[serde(default)]
    pub scheduler_type: Option<String>,

    /// Epochs between reductions for step_decay
    #[serde(default)]
    pub step_size: Option<usize>,

    /// Multiplicative factor for step_decay
    #[serde(default)]
    pub gamma: Option<f32>,

    /// Per-epoch multiplier for exponential
    #[serde(default)]
    pub decay_rate: Option<f32>,
}

/// Loads and validates a training configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use neural_network::config::load_config;
///
/// let cfg = load_config("config/convergence.json").unwrap();
/// assert_eq!(cfg.topology, vec![4, 3, 4, 2]);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    TrainingConfig::from_json_str(&contents)
}

impl TrainingConfig {
    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Topology::from_sizes(self.topology.clone())?;
        self.activation()?;

        if self.epochs == 0 {
            return Err(NetworkError::Config(
                "epochs must be greater than 0".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetworkError::Config(
                "learning_rate must be positive".to_string(),
            ));
        }

        let scheduler_type = self.scheduler_type();
        if !SCHEDULER_TYPES.contains(&scheduler_type.as_str()) {
            return Err(NetworkError::Config(format!(
                "Invalid scheduler type '{}'. Must be one of: {}",
                scheduler_type,
                SCHEDULER_TYPES.join(", ")
            )));
        }

        match scheduler_type.as_str() {
            "step_decay" => {
                match self.step_size {
                    None => {
                        return Err(NetworkError::Config(
                            "step_decay requires 'step_size'".to_string(),
                        ))
                    }
                    Some(0) => {
                        return Err(NetworkError::Config(
                            "step_size must be greater than 0".to_string(),
                        ))
                    }
                    Some(_) => {}
                }
                match self.gamma {
                    None => {
                        return Err(NetworkError::Config(
                            "step_decay requires 'gamma'".to_string(),
                        ))
                    }
                    Some(gamma) if !(gamma > 0.0 && gamma <= 1.0) => {
                        return Err(NetworkError::Config(
                            "gamma must be in (0, 1]".to_string(),
                        ))
                    }
                    Some(_) => {}
                }
            }
            "exponential" => match self.decay_rate {
                None => {
                    return Err(NetworkError::Config(
                        "exponential requires 'decay_rate'".to_string(),
                    ))
                }
                Some(rate) if !(rate > 0.0 && rate <= 1.0) => {
                    return Err(NetworkError::Config(
                        "decay_rate must be in (0, 1]".to_string(),
                    ))
                }
                Some(_) => {}
            },
            _ => {}
        }

        Ok(())
    }

    pub fn activation(&self) -> Result<Activation> {
        self.activation
            .as_deref()
            .map_or(Ok(Activation::default()), |name| name.parse())
    }

    pub fn topology(&self) -> Result<Topology> {
        Topology::from_sizes(self.topology.clone())
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    fn scheduler_type(&self) -> String {
        self.scheduler_type
            .as_deref()
            .unwrap_or("constant")
            .to_lowercase()
    }

    /// Scheduler described by the configuration.
    pub fn scheduler(&self) -> Box<dyn LRScheduler> {
        match self.scheduler_type().as_str() {
            "step_decay" => Box::new(StepDecay::new(
                self.learning_rate,
                self.step_size.unwrap_or(1),
                self.gamma.unwrap_or(1.0),
            )),
            "exponential" => Box::new(ExponentialDecay::new(
                self.learning_rate,
                self.decay_rate.unwrap_or(1.0),
            )),
            _ => Box::new(Constant::new(self.learning_rate)),
        }
    }

    /// Network with the configured topology and activation, seeded with [`TrainingConfig::seed`].
    pub fn build_network(&self) -> Result<Network> {
        Network::with_seed(self.topology()?, self.activation()?, self.seed())
    }

    /// Trainer with the configured epochs, learning rate, scheduler and shuffling.
    ///
    /// The shuffle generator is seeded from the configured seed plus one so it
    /// does not replay the weight initialization sequence.
    pub fn build_trainer(&self) -> Trainer {
        let trainer =
            Trainer::new(self.epochs, self.learning_rate).with_scheduler(self.scheduler());
        if self.shuffle.unwrap_or(false) {
            trainer.with_shuffle(SimpleRng::new(self.seed().wrapping_add(1)))
        } else {
            trainer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config = TrainingConfig::from_json_str(
            r#"{ "topology": [2, 1], "epochs": 3, "learning_rate": 0.1 }"#,
        )
        .unwrap();

        assert_eq!(config.activation().unwrap(), Activation::Sigmoid);
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.scheduler().get_lr(), 0.1);
    }

    #[test]
    fn test_unknown_scheduler_rejected() {
        let result = TrainingConfig::from_json_str(
            r#"{ "topology": [2, 1], "epochs": 3, "learning_rate": 0.1, "scheduler_type": "cosine" }"#,
        );
        assert!(matches!(result, Err(NetworkError::Config(_))));
    }
}
