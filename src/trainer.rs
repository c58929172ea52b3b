//! Epoch loop
//!
//! Presents labeled examples to a [`Network`], one `feed_forward` /
//! `back_propagation` step per example, and accumulates the squared output
//! error as a convergence signal.

use tracing::{debug, info};

use crate::error::{NetworkError, Result};
use crate::network::Network;
use crate::utils::{LRScheduler, SimpleRng};

/// One labeled training pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub input: Vec<f32>,
    pub expected: Vec<f32>,
}

impl TrainingExample {
    pub fn new(input: Vec<f32>, expected: Vec<f32>) -> Self {
        Self { input, expected }
    }
}

impl From<(Vec<f32>, Vec<f32>)> for TrainingExample {
    fn from((input, expected): (Vec<f32>, Vec<f32>)) -> Self {
        Self::new(input, expected)
    }
}

/// Summary of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    /// 0-indexed epoch number.
    pub epoch: usize,
    /// Learning rate the epoch was trained with.
    pub learning_rate: f32,
    /// Squared output error averaged over examples and output neurons.
    pub mean_squared_error: f32,
}

/// Training loop configuration and per-epoch history.
///
/// With no scheduler and no shuffling, examples are presented in dataset
/// order at a constant learning rate.
///
/// # Example
///
/// ```
/// use neural_network::{Activation, Network, Trainer, TrainingExample};
/// use neural_network::utils::{SimpleRng, StepDecay};
///
/// let mut network = Network::from_sizes(&[2, 2, 1], Activation::Sigmoid, 3).unwrap();
/// let dataset = vec![
///     TrainingExample::new(vec![0.0, 1.0], vec![1.0]),
///     TrainingExample::new(vec![1.0, 0.0], vec![0.0]),
/// ];
///
/// let mut trainer = Trainer::new(4, 0.5)
///     .with_scheduler(Box::new(StepDecay::new(0.5, 2, 0.5)))
///     .with_shuffle(SimpleRng::new(9));
/// let errors = trainer.fit(&mut network, &dataset).unwrap();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(trainer.history().len(), 4);
/// assert_eq!(trainer.history()[2].learning_rate, 0.25);
/// ```
pub struct Trainer {
    epochs: usize,
    learning_rate: f32,
    scheduler: Option<Box<dyn LRScheduler>>,
    shuffle: Option<SimpleRng>,
    history: Vec<EpochStats>,
}

impl Trainer {
    pub fn new(epochs: usize, learning_rate: f32) -> Self {
        Self {
            epochs,
            learning_rate,
            scheduler: None,
            shuffle: None,
            history: Vec::new(),
        }
    }

    /// Use a per-epoch learning rate instead of the fixed one.
    pub fn with_scheduler(mut self, scheduler: Box<dyn LRScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Reorder the examples before every epoch.
    pub fn with_shuffle(mut self, rng: SimpleRng) -> Self {
        self.shuffle = Some(rng);
        self
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Statistics of the most recent [`Trainer::fit`], one entry per epoch.
    pub fn history(&self) -> &[EpochStats] {
        &self.history
    }

    /// Train `network` on `dataset`.
    ///
    /// Returns, per output neuron, the squared error summed over every
    /// (epoch, example) step and divided by the number of epochs.
    ///
    /// # Errors
    ///
    /// * [`NetworkError::InvalidHyperparameter`] for zero epochs, an empty
    ///   dataset, an initial learning rate that is not positive and finite,
    ///   or a schedule that turns negative or non-finite within `epochs`.
    ///   All of these are reported before the network is touched.
    /// * Dimension errors of individual examples, unchanged.
    pub fn fit(&mut self, network: &mut Network, dataset: &[TrainingExample]) -> Result<Vec<f32>> {
        self.validate(dataset)?;
        self.history.clear();

        info!(
            topology = %network.topology(),
            activation = network.activation().name(),
            epochs = self.epochs,
            examples = dataset.len(),
            "training started"
        );

        let output_size = network.output_size();
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        let mut totals = vec![0.0f32; output_size];

        for epoch in 0..self.epochs {
            let learning_rate = self.current_learning_rate();
            if let Some(rng) = self.shuffle.as_mut() {
                rng.shuffle_usize(&mut order);
            }

            let mut epoch_error = 0.0f32;
            for &index in &order {
                let example = &dataset[index];
                let actual = network.feed_forward(&example.input)?;
                let errors = network.back_propagation(&example.expected, &actual, learning_rate)?;
                for (total, error) in totals.iter_mut().zip(&errors) {
                    let squared = error * error;
                    *total += squared;
                    epoch_error += squared;
                }
            }

            let stats = EpochStats {
                epoch,
                learning_rate,
                mean_squared_error: epoch_error / (dataset.len() * output_size) as f32,
            };
            debug!(
                epoch = stats.epoch,
                learning_rate = stats.learning_rate,
                mse = stats.mean_squared_error,
                "epoch finished"
            );
            self.history.push(stats);

            if let Some(scheduler) = self.scheduler.as_mut() {
                scheduler.step();
            }
        }

        let epochs = self.epochs as f32;
        for total in &mut totals {
            *total /= epochs;
        }

        info!(
            final_mse = self.history.last().map_or(0.0, |s| s.mean_squared_error),
            "training finished"
        );
        Ok(totals)
    }

    fn current_learning_rate(&self) -> f32 {
        self.scheduler
            .as_ref()
            .map_or(self.learning_rate, |scheduler| scheduler.get_lr())
    }

    fn validate(&mut self, dataset: &[TrainingExample]) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetworkError::InvalidHyperparameter(
                "epochs must be greater than 0".to_string(),
            ));
        }
        if dataset.is_empty() {
            return Err(NetworkError::InvalidHyperparameter(
                "dataset must contain at least one example".to_string(),
            ));
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.reset();
        }
        check_learning_rate(self.current_learning_rate())?;
        self.check_schedule()
    }

    // Walks the whole schedule once. Decayed rates may reach zero.
    fn check_schedule(&mut self) -> Result<()> {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return Ok(());
        };
        let mut result = Ok(());
        for epoch in 0..self.epochs {
            let learning_rate = scheduler.get_lr();
            if !(learning_rate.is_finite() && learning_rate >= 0.0) {
                result = Err(NetworkError::InvalidHyperparameter(format!(
                    "scheduled learning rate at epoch {} is {}",
                    epoch, learning_rate
                )));
                break;
            }
            scheduler.step();
        }
        scheduler.reset();
        result
    }
}

fn check_learning_rate(learning_rate: f32) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(NetworkError::InvalidHyperparameter(format!(
            "learning rate must be positive and finite, got {}",
            learning_rate
        )));
    }
    Ok(())
}
