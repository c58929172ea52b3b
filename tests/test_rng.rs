// Tests for RNG reproducibility and the initialization it drives.

use std::sync::Arc;

use neural_network::layers::connection::INIT_RANGE;
use neural_network::{Activation, ActivationFunction, LayerConnection, SimpleRng};

// ============================================================================
// SimpleRng
// ============================================================================

#[test]
fn test_same_seed_same_sequence() {
    let mut a = SimpleRng::new(12345);
    let mut b = SimpleRng::new(12345);
    for _ in 0..1000 {
        assert_eq!(a.next_u32(), b.next_u32());
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = SimpleRng::new(12345);
    let mut b = SimpleRng::new(54321);
    let same = (0..100).filter(|_| a.next_u32() == b.next_u32()).count();
    assert!(same < 5);
}

#[test]
fn test_clone_continues_sequence() {
    let mut rng = SimpleRng::new(99);
    rng.next_u32();
    let mut copy = rng.clone();
    assert_eq!(rng.next_u32(), copy.next_u32());
}

#[test]
fn test_gen_range_mean_near_center() {
    let mut rng = SimpleRng::new(2468);
    let n = 10_000;
    let mean: f32 = (0..n).map(|_| rng.gen_range_f32(-0.5, 0.5)).sum::<f32>() / n as f32;
    assert!(mean.abs() < 0.05, "mean {} too far from 0", mean);
}

#[test]
fn test_shuffle_is_permutation() {
    let mut rng = SimpleRng::new(33333);
    let mut data: Vec<usize> = (0..10).collect();
    let original = data.clone();

    rng.shuffle_usize(&mut data);

    let mut sorted = data.clone();
    sorted.sort();
    assert_eq!(sorted, original);
    assert_ne!(data, original);
}

#[test]
fn test_shuffle_empty() {
    let mut rng = SimpleRng::new(44444);
    let mut data: Vec<usize> = vec![];
    rng.shuffle_usize(&mut data);
    assert!(data.is_empty());
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_initial_parameters_in_symmetric_range() {
    let activation: Arc<dyn ActivationFunction> = Arc::new(Activation::Sigmoid);
    let mut rng = SimpleRng::new(42);
    let layer = LayerConnection::new(30, 20, activation, &mut rng).unwrap();

    let params: Vec<f32> = layer.weights().iter().chain(layer.bias()).copied().collect();
    assert!(params.iter().all(|p| (-INIT_RANGE..=INIT_RANGE).contains(p)));
    assert!(params.iter().any(|&p| p < 0.0));
    assert!(params.iter().any(|&p| p > 0.0));
}

#[test]
fn test_bias_is_drawn_after_weights() {
    let activation: Arc<dyn ActivationFunction> = Arc::new(Activation::Sigmoid);
    let mut rng = SimpleRng::new(5);
    let layer = LayerConnection::new(2, 2, activation, &mut rng).unwrap();

    let mut replay = SimpleRng::new(5);
    let draws: Vec<f32> = (0..6)
        .map(|_| replay.gen_range_f32(-INIT_RANGE, INIT_RANGE))
        .collect();
    assert_eq!(layer.weights(), &draws[..4]);
    assert_eq!(layer.bias(), &draws[4..]);
}
