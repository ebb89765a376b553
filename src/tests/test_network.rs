use ndarray::arr1;

use crate::backend::{CpuBackend, SerialBackend};
use crate::builders::NetworkBuilder;
use crate::error::NetError;
use crate::layers::ParameterInitializer;
use crate::network::{argmax, NeuralNetwork};

fn seeded(topology: &[usize], seed: u64) -> NeuralNetwork<CpuBackend> {
    NeuralNetwork::with_initializer(topology, CpuBackend::new(), &mut ParameterInitializer::from_seed(seed)).unwrap()
}

#[test]
fn test_neural_network_creation() {
    let network = NeuralNetwork::new(&[3, 4, 2]).unwrap();

    assert_eq!(network.layers().len(), 3);
    assert_eq!(network.topology(), vec![3, 4, 2]);
    assert_eq!(network.input_size(), 3);
    assert_eq!(network.output_size(), 2);
    assert_eq!(network.parameter_count(), 3 * 4 + 4 + 4 * 2 + 2);
    assert_eq!(network.guess(), None);
    assert_eq!(network.last_average_error(), 0.0);
}

#[test]
fn test_forward_pass() {
    let mut network = seeded(&[3, 4, 2], 1);
    let guess = network.forward(&[1.0, 2.0, 3.0]).unwrap();

    assert!(guess < 2);
    assert_eq!(network.guess(), Some(guess));
    assert_eq!(network.output().len(), 2);
    assert_eq!(guess, argmax(network.output()));
    assert_eq!(network.layers()[0].activations().to_vec(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_forward_is_deterministic() {
    let mut network = seeded(&[5, 6, 3], 8);
    let input = [0.2, -0.4, 0.9, 0.0, 1.0];

    let first = network.forward(&input).unwrap();
    let snapshot: Vec<_> = network.layers().iter().map(|l| l.activations().to_owned()).collect();
    let second = network.forward(&input).unwrap();

    assert_eq!(first, second);
    for (layer, before) in network.layers().iter().zip(snapshot) {
        assert_eq!(layer.activations(), before);
    }
}

#[test]
fn test_backward_updates_weights_but_not_bias_weights() {
    let mut network = seeded(&[3, 4, 2], 2);
    let weights_before: Vec<_> = network.layers().iter().map(|l| l.weights().to_owned()).collect();
    let bias_weights_before: Vec<_> = network.layers().iter().map(|l| l.bias_weights().to_owned()).collect();

    network.forward(&[0.5, 1.0, -1.0]).unwrap();
    network.backward(1).unwrap();

    for (i, layer) in network.layers().iter().enumerate().skip(1) {
        assert_ne!(layer.weights(), weights_before[i], "layer {} weights unchanged", i);
        assert_eq!(layer.bias_weights(), bias_weights_before[i]);
        assert!(layer.deltas().iter().any(|&d| d != 0.0));
    }
}

#[test]
fn test_output_delta_sign_matches_raw_error() {
    let mut network = seeded(&[4, 5, 3], 4);
    network.forward(&[1.0, 0.0, 0.5, 0.25]).unwrap();
    let output = network.output().to_owned();
    network.backward(2).unwrap();

    let deltas = network.layers()[2].deltas().to_owned();
    for j in 0..3 {
        let target = if j == 2 { 1.0 } else { 0.0 };
        let raw_error: f64 = output[j] - target;
        assert_eq!(deltas[j].signum(), raw_error.signum(), "neuron {}", j);
        assert!((deltas[j] - raw_error * output[j] * (1.0 - output[j])).abs() < 1e-15);
    }
}

#[test]
fn test_evaluate_loss() {
    let mut network = seeded(&[2, 3, 2], 6);
    network.forward(&[1.0, 1.0]).unwrap();
    let output = network.output().to_owned();

    let loss = network.evaluate_loss(0).unwrap();
    let expected = ((output[0] - 1.0).powi(2) + output[1].powi(2)) / 2.0;
    assert!((loss - expected).abs() < 1e-15);
    assert_eq!(network.last_average_error(), loss);

    // Loss is diagnostic only
    let again = network.evaluate_loss(0).unwrap();
    assert_eq!(loss, again);
}

#[test]
fn test_train_sample() {
    let mut network = seeded(&[2, 3, 2], 6);
    let outcome = network.train_sample(&[0.0, 1.0], 1).unwrap();

    assert_eq!(outcome.correct, outcome.guess == 1);
    assert_eq!(outcome.loss, network.last_average_error());
    // Forward state was consumed by the backward pass
    assert_eq!(network.backward(1), Err(NetError::MissingForwardPass));
}

#[test]
fn test_learning_rate() {
    let mut network = seeded(&[2, 2], 1).with_learning_rate(0.25).unwrap();
    assert_eq!(network.learning_rate(), 0.25);

    assert!(network.set_learning_rate(-0.1).is_err());
    assert!(network.set_learning_rate(f64::INFINITY).is_err());
    assert_eq!(network.learning_rate(), 0.25);
}

#[test]
fn test_argmax_ties_and_floor() {
    assert_eq!(argmax(arr1(&[0.2, 0.7, 0.7]).view()), 1);
    assert_eq!(argmax(arr1(&[0.9, 0.1]).view()), 0);
    assert_eq!(argmax(arr1(&[0.1, 0.1, 0.3]).view()), 2);
    // Running maximum starts at 0.0
    assert_eq!(argmax(arr1(&[0.0, 0.0]).view()), 0);
    assert_eq!(argmax(arr1(&[-1.0, -0.5]).view()), 0);
}

#[test]
fn test_layer_mut_keeps_shapes() {
    let mut network = seeded(&[2, 2, 1], 3);
    let layer = network.layer_mut(1).unwrap();
    assert!(layer.set_weights(&[0.0; 4]).is_ok());
    assert!(layer.set_weights(&[0.0; 3]).is_err());
    assert!(network.layer(3).is_none());
}

#[test]
fn test_builder_and_constructor_agree() {
    let built = NetworkBuilder::new(&[3, 3, 2]).seed(21).build_with(SerialBackend::new()).unwrap();
    let constructed = seeded(&[3, 3, 2], 21);
    assert_eq!(built.layers(), constructed.layers());
}
