//! Tests for the training loop
//!
//! - Convergence on small fixed datasets
//! - Error accumulation of `learn`
//! - Trainer extensions: shuffling, learning rate schedules, history

use neural_network::utils::{ExponentialDecay, SimpleRng, StepDecay};
use neural_network::{Activation, Network, NetworkError, Trainer, TrainingExample};

fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn two_pairs() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(vec![1.0, 0.0, 0.0, 1.0], vec![0.5, -0.5]),
        TrainingExample::new(vec![0.0, 1.0, 1.0, 0.0], vec![-0.5, 0.5]),
    ]
}

// ============================================================================
// Convergence
// ============================================================================

mod convergence_tests {
    use super::*;

    #[test]
    fn test_tanh_network_moves_toward_both_targets() {
        let mut network = Network::from_sizes(&[4, 3, 4, 2], Activation::Tanh, 42).unwrap();
        let dataset = two_pairs();

        let before: Vec<f32> = dataset
            .iter()
            .map(|ex| distance(&network.predict(&ex.input).unwrap(), &ex.expected))
            .collect();

        network.learn(&dataset, 10, 1.0).unwrap();

        for (example, before) in dataset.iter().zip(before) {
            let after = distance(&network.predict(&example.input).unwrap(), &example.expected);
            assert!(
                after < before,
                "distance for {:?} went from {} to {}",
                example.input,
                before,
                after
            );
        }
    }

    #[test]
    fn test_convergence_holds_across_seeds() {
        for seed in [1u64, 7, 13, 2024] {
            let mut network = Network::from_sizes(&[4, 3, 4, 2], Activation::Tanh, seed).unwrap();
            let dataset = two_pairs();
            let before: f32 = dataset
                .iter()
                .map(|ex| distance(&network.predict(&ex.input).unwrap(), &ex.expected))
                .sum();

            network.learn(&dataset, 10, 1.0).unwrap();

            let after: f32 = dataset
                .iter()
                .map(|ex| distance(&network.predict(&ex.input).unwrap(), &ex.expected))
                .sum();
            assert!(after < before, "seed {}: {} -> {}", seed, before, after);
        }
    }

    #[test]
    fn test_two_layer_sigmoid_network_learns() {
        let mut network = Network::from_sizes(&[2, 1], Activation::Sigmoid, 3).unwrap();
        let dataset = vec![
            TrainingExample::new(vec![1.0, 0.0], vec![0.9]),
            TrainingExample::new(vec![0.0, 1.0], vec![0.1]),
        ];

        let first = network.learn(&dataset, 1, 0.5).unwrap();
        network.learn(&dataset, 200, 0.5).unwrap();
        let last = network.learn(&dataset, 1, 0.5).unwrap();

        assert!(last[0] < first[0], "error {} not below {}", last[0], first[0]);
        assert!((network.predict(&[1.0, 0.0]).unwrap()[0] - 0.9).abs() < 0.1);
        assert!((network.predict(&[0.0, 1.0]).unwrap()[0] - 0.1).abs() < 0.1);
    }
}

// ============================================================================
// Error accumulation
// ============================================================================

mod accumulation_tests {
    use super::*;

    #[test]
    fn test_learn_returns_squared_error_per_epoch() {
        let dataset = two_pairs();
        let epochs = 3;
        let lr = 0.2;

        let mut manual = Network::from_sizes(&[4, 3, 2], Activation::Tanh, 5).unwrap();
        let mut totals = vec![0.0f32; 2];
        for _ in 0..epochs {
            for example in &dataset {
                let actual = manual.feed_forward(&example.input).unwrap();
                let errors = manual
                    .back_propagation(&example.expected, &actual, lr)
                    .unwrap();
                for (total, e) in totals.iter_mut().zip(&errors) {
                    *total += e * e;
                }
            }
        }
        for total in &mut totals {
            *total /= epochs as f32;
        }

        let mut network = Network::from_sizes(&[4, 3, 2], Activation::Tanh, 5).unwrap();
        let learned = network.learn(&dataset, epochs, lr).unwrap();

        assert_eq!(learned, totals);
        for (a, b) in network.layers().iter().zip(manual.layers()) {
            assert_eq!(a.weights(), b.weights());
        }
    }

    #[test]
    fn test_learn_leaves_no_pending_pass() {
        let mut network = Network::from_sizes(&[4, 2], Activation::Sigmoid, 5).unwrap();
        network.learn(&two_pairs(), 2, 0.1).unwrap();
        assert!(!network.has_pending_pass());
    }

    #[test]
    fn test_invalid_hyperparameters() {
        let mut network = Network::from_sizes(&[4, 2], Activation::Sigmoid, 5).unwrap();
        assert!(matches!(
            network.learn(&two_pairs(), 0, 0.1),
            Err(NetworkError::InvalidHyperparameter(_))
        ));
        assert!(matches!(
            network.learn(&[], 1, 0.1),
            Err(NetworkError::InvalidHyperparameter(_))
        ));
        assert!(matches!(
            network.learn(&two_pairs(), 1, -0.1),
            Err(NetworkError::InvalidHyperparameter(_))
        ));
    }
}

// ============================================================================
// Trainer extensions
// ============================================================================

mod trainer_tests {
    use super::*;

    #[test]
    fn test_default_trainer_matches_learn() {
        let mut a = Network::from_sizes(&[4, 3, 2], Activation::Tanh, 9).unwrap();
        let mut b = Network::from_sizes(&[4, 3, 2], Activation::Tanh, 9).unwrap();

        let from_learn = a.learn(&two_pairs(), 4, 0.3).unwrap();
        let from_trainer = Trainer::new(4, 0.3).fit(&mut b, &two_pairs()).unwrap();

        assert_eq!(from_learn, from_trainer);
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let run = || {
            let mut network = Network::from_sizes(&[4, 3, 2], Activation::Tanh, 9).unwrap();
            let mut trainer = Trainer::new(6, 0.3).with_shuffle(SimpleRng::new(77));
            let errors = trainer.fit(&mut network, &two_pairs()).unwrap();
            (errors, network.layers()[0].weights().to_vec())
        };

        let (errors_a, weights_a) = run();
        let (errors_b, weights_b) = run();
        assert_eq!(errors_a, errors_b);
        assert_eq!(weights_a, weights_b);
    }

    #[test]
    fn test_step_decay_schedule_in_history() {
        let mut network = Network::from_sizes(&[4, 2], Activation::Sigmoid, 2).unwrap();
        let mut trainer =
            Trainer::new(5, 0.8).with_scheduler(Box::new(StepDecay::new(0.8, 2, 0.5)));
        trainer.fit(&mut network, &two_pairs()).unwrap();

        let rates: Vec<f32> = trainer.history().iter().map(|s| s.learning_rate).collect();
        assert_eq!(rates, vec![0.8, 0.8, 0.4, 0.4, 0.2]);
    }

    #[test]
    fn test_scheduler_is_reset_between_fits() {
        let mut network = Network::from_sizes(&[4, 2], Activation::Sigmoid, 2).unwrap();
        let mut trainer =
            Trainer::new(3, 0.5).with_scheduler(Box::new(ExponentialDecay::new(0.5, 0.5)));

        trainer.fit(&mut network, &two_pairs()).unwrap();
        trainer.fit(&mut network, &two_pairs()).unwrap();

        assert_eq!(trainer.history().len(), 3);
        assert_eq!(trainer.history()[0].learning_rate, 0.5);
    }

    #[test]
    fn test_history_mse_is_finite_and_non_negative() {
        let mut network = Network::from_sizes(&[4, 3, 4, 2], Activation::Tanh, 42).unwrap();
        let mut trainer = Trainer::new(10, 1.0);
        trainer.fit(&mut network, &two_pairs()).unwrap();

        for stats in trainer.history() {
            assert!(stats.mean_squared_error.is_finite());
            assert!(stats.mean_squared_error >= 0.0);
        }
    }
}
