use crate::backend::SerialBackend;
use crate::builders::NetworkBuilder;
use crate::error::NetError;
use crate::network::NeuralNetwork;

#[test]
fn test_input_size_mismatch() {
    let mut network = NetworkBuilder::new(&[3, 2]).seed(1).build().unwrap();

    assert_eq!(
        network.forward(&[1.0, 2.0]),
        Err(NetError::InputSizeMismatch { expected: 3, actual: 2 })
    );
    assert_eq!(
        network.forward(&[1.0; 4]),
        Err(NetError::InputSizeMismatch { expected: 3, actual: 4 })
    );
    assert!(matches!(network.forward(&[]), Err(NetError::InputSizeMismatch { .. })));

    // Rejected before any state changed, and the error is recoverable
    assert_eq!(network.guess(), None);
    assert!(NetError::InputSizeMismatch { expected: 3, actual: 2 }.is_recoverable());
    assert!(network.forward(&[1.0, 2.0, 3.0]).is_ok());
}

#[test]
fn test_mismatch_after_forward_drops_forward_state() {
    let mut network = NetworkBuilder::new(&[2, 2]).seed(1).build().unwrap();
    network.forward(&[0.5, 0.5]).unwrap();
    assert!(network.forward(&[0.5]).is_err());
    assert_eq!(network.backward(0), Err(NetError::MissingForwardPass));
}

#[test]
fn test_backward_without_forward() {
    let mut network = NetworkBuilder::new(&[2, 3, 2]).seed(1).build_with(SerialBackend::new()).unwrap();
    assert_eq!(network.backward(0), Err(NetError::MissingForwardPass));
    assert_eq!(network.evaluate_loss(0), Err(NetError::MissingForwardPass));
    // Nothing was dispatched
    assert_eq!(network.backend().attempts(), 0);
}

#[test]
fn test_invalid_label() {
    let mut network = NetworkBuilder::new(&[2, 3, 2]).seed(1).build().unwrap();
    network.forward(&[0.5, 0.5]).unwrap();

    assert_eq!(network.backward(2), Err(NetError::InvalidLabel { label: 2, classes: 2 }));
    assert_eq!(network.evaluate_loss(7), Err(NetError::InvalidLabel { label: 7, classes: 2 }));
    assert!(matches!(network.train_sample(&[0.5, 0.5], 9), Err(NetError::InvalidLabel { .. })));

    // A bad label does not consume the forward pass
    assert!(network.backward(1).is_ok());
}

#[test]
fn test_single_output_neuron_always_guesses_zero() {
    let mut network = NetworkBuilder::new(&[3, 1]).seed(2).build().unwrap();
    assert_eq!(network.forward(&[0.1, 0.2, 0.3]).unwrap(), 0);
    assert!(network.backward(0).is_ok());
}

#[test]
fn test_saturated_inputs_stay_in_range() {
    let mut network = NetworkBuilder::new(&[3, 4, 3]).seed(5).init_scale(1.0).build().unwrap();
    network.forward(&[1e6, -1e6, 1e6]).unwrap();

    for &a in network.output().iter() {
        assert!((0.0..=1.0).contains(&a));
        assert!(a.is_finite());
    }
    network.backward(1).unwrap();
    for layer in &network.layers()[1..] {
        assert!(layer.weights().iter().all(|w| w.is_finite()));
    }
}

#[test]
fn test_minimal_topology() {
    let mut network = NeuralNetwork::new(&[1, 1]).unwrap();
    assert_eq!(network.parameter_count(), 2);
    let outcome = network.train_sample(&[1.0], 0).unwrap();
    assert_eq!(outcome.guess, 0);
    assert!(outcome.correct);
}

#[test]
fn test_error_display() {
    let err = NetError::DispatchFailure {
        kernel: "feed_forward",
        layer: 3,
        reason: "device lost".to_string(),
    };
    assert_eq!(err.to_string(), "Dispatch of 'feed_forward' for layer 3 failed: device lost");
    assert!(!err.is_recoverable());

    let err = NetError::invalid_topology("need at least 2 layers, got 1");
    assert_eq!(err.to_string(), "Invalid topology: need at least 2 layers, got 1");

    let io: NetError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, NetError::Io(_)));
}
