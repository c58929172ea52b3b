//! Learning rate schedulers
//!
//! A scheduler supplies the learning rate for each training epoch. The trainer
//! asks for the current rate before an epoch and advances the scheduler after
//! it, so epoch 0 always trains at the initial rate.

/// Per-epoch learning rate policy.
///
/// # Example
///
/// ```
/// use neural_network::utils::lr_scheduler::{LRScheduler, StepDecay};
///
/// let mut scheduler = StepDecay::new(0.1, 3, 0.5);
/// for _ in 0..3 {
///     scheduler.step();
/// }
/// assert!((scheduler.get_lr() - 0.05).abs() < 1e-7);
/// scheduler.reset();
/// assert_eq!(scheduler.get_lr(), 0.1);
/// ```
pub trait LRScheduler: Send {
    /// Learning rate for the current epoch.
    fn get_lr(&self) -> f32;

    /// Advance to the next epoch.
    fn step(&mut self);

    /// Return to the initial learning rate and epoch 0.
    fn reset(&mut self);
}

/// Fixed learning rate. The trainer uses this when no scheduler is set.
#[derive(Debug, Clone)]
pub struct Constant {
    lr: f32,
}

impl Constant {
    pub fn new(lr: f32) -> Self {
        Self { lr }
    }
}

impl LRScheduler for Constant {
    fn get_lr(&self) -> f32 {
        self.lr
    }

    fn step(&mut self) {}

    fn reset(&mut self) {}
}

/// Step decay: `lr = initial_lr * gamma^(epoch / step_size)`.
///
/// A `step_size` of zero is treated as one.
#[derive(Debug, Clone)]
pub struct StepDecay {
    initial_lr: f32,
    step_size: usize,
    gamma: f32,
    current_epoch: usize,
    current_lr: f32,
}

impl StepDecay {
    pub fn new(initial_lr: f32, step_size: usize, gamma: f32) -> Self {
        Self {
            initial_lr,
            step_size: step_size.max(1),
            gamma,
            current_epoch: 0,
            current_lr: initial_lr,
        }
    }
}

impl LRScheduler for StepDecay {
    fn get_lr(&self) -> f32 {
        self.current_lr
    }

    fn step(&mut self) {
        self.current_epoch += 1;
        let num_decays = self.current_epoch / self.step_size;
        self.current_lr = self.initial_lr * self.gamma.powi(num_decays as i32);
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
        self.current_lr = self.initial_lr;
    }
}

/// Exponential decay: `lr = initial_lr * decay_rate^epoch`.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    initial_lr: f32,
    decay_rate: f32,
    current_epoch: usize,
    current_lr: f32,
}

impl ExponentialDecay {
    pub fn new(initial_lr: f32, decay_rate: f32) -> Self {
        Self {
            initial_lr,
            decay_rate,
            current_epoch: 0,
            current_lr: initial_lr,
        }
    }
}

impl LRScheduler for ExponentialDecay {
    fn get_lr(&self) -> f32 {
        self.current_lr
    }

    fn step(&mut self) {
        self.current_epoch += 1;
        self.current_lr = self.initial_lr * self.decay_rate.powi(self.current_epoch as i32);
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
        self.current_lr = self.initial_lr;
    }
}
