use ndarray::ArrayView1;

use crate::backend::{BackwardLanes, ComputeBackend, CpuBackend, Dispatch, ErrorSignal, ForwardLanes};
use crate::error::{NetError, Result};
use crate::layers::{Layer, ParameterInitializer, Topology};
use crate::loss::{one_hot, Loss, SquaredError};

/// Default step size of the per-sample weight update.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Result of [`NeuralNetwork::train_sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOutcome {
    pub guess: usize,
    pub correct: bool,
    pub loss: f64,
}

/// A fully connected feed-forward classifier whose per-neuron work runs on a
/// [`ComputeBackend`].
///
/// The network owns its layers and its backend. Layer 0 holds the input features; each
/// later layer is computed from the one before it by a single dispatch of the
/// `feed_forward` kernel, and trained by a single dispatch of `back_propagation`, with
/// layers visited strictly in order so a layer never reads half-written inputs.
pub struct NeuralNetwork<B: ComputeBackend = CpuBackend> {
    layers: Vec<Layer>,
    backend: B,
    learning_rate: f64,
    guess: Option<usize>,
    last_average_error: f64,
    forward_ready: bool,
}

impl NeuralNetwork<CpuBackend> {
    /// Build a network on the multi-threaded CPU backend with time-seeded parameters.
    pub fn new(topology: &[usize]) -> Result<Self> {
        Self::with_backend(topology, CpuBackend::new())
    }
}

impl<B: ComputeBackend> NeuralNetwork<B> {
    /// Build a network on `backend` with time-seeded parameters.
    pub fn with_backend(topology: &[usize], backend: B) -> Result<Self> {
        Self::with_initializer(topology, backend, &mut ParameterInitializer::from_time())
    }

    /// Build a network on `backend`, seeding parameters from `initializer`.
    pub fn with_initializer(
        topology: &[usize],
        backend: B,
        initializer: &mut ParameterInitializer,
    ) -> Result<Self> {
        let topology = Topology::new(topology)?;
        let mut layers = topology.build_layers();
        let draws = initializer.initialize(&mut layers);

        log::info!(
            "constructed network {:?} with {} parameters (seed {})",
            topology.sizes(),
            draws,
            initializer.seed()
        );

        Ok(NeuralNetwork {
            layers,
            backend,
            learning_rate: DEFAULT_LEARNING_RATE,
            guess: None,
            last_average_error: 0.0,
            forward_ready: false,
        })
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Result<Self> {
        self.set_learning_rate(learning_rate)?;
        Ok(self)
    }

    /// Run one inference pass and return the index of the strongest output neuron.
    ///
    /// Fails with [`NetError::InputSizeMismatch`] before touching any state if the
    /// feature vector does not match the input layer. A dispatch failure leaves the
    /// activations undefined and the network without forward state.
    pub fn forward(&mut self, features: &[f64]) -> Result<usize> {
        self.forward_ready = false;
        self.guess = None;
        self.layers[0].load_input(features)?;

        for i in 1..self.layers.len() {
            let (head, tail) = self.layers.split_at_mut(i);
            let prev = &head[i - 1];
            let (weights, biases, bias_weights, outputs) = tail[0].forward_parts();

            self.backend.dispatch(Dispatch::FeedForward(ForwardLanes {
                layer: i,
                inputs: prev.activations(),
                weights,
                biases,
                bias_weights,
                outputs,
            }))?;
        }

        let guess = argmax(self.output());
        self.guess = Some(guess);
        self.forward_ready = true;
        log::trace!("forward pass guessed {}", guess);
        Ok(guess)
    }

    /// Back-propagate the error of the last forward pass against `target` and update the
    /// incoming weights of every non-input layer, output layer first.
    ///
    /// Consumes the forward state: a second call without a new `forward` fails with
    /// [`NetError::MissingForwardPass`]. Bias weights are left unchanged.
    pub fn backward(&mut self, target: usize) -> Result<()> {
        self.check_label(target)?;
        if !self.forward_ready {
            return Err(NetError::MissingForwardPass);
        }
        self.forward_ready = false;

        let last = self.layers.len() - 1;
        for i in (1..=last).rev() {
            let (head, tail) = self.layers.split_at_mut(i);
            let prev = &head[i - 1];
            let (current, rest) = tail.split_at_mut(1);
            let signal = match rest.first() {
                Some(next) => ErrorSignal::NextLayer {
                    weights: next.weights(),
                    deltas: next.deltas(),
                },
                None => ErrorSignal::Target(target),
            };
            let (activations, weights, deltas) = current[0].backward_parts();

            self.backend.dispatch(Dispatch::BackPropagate(BackwardLanes {
                layer: i,
                inputs: prev.activations(),
                activations,
                weights,
                deltas,
                signal,
                learning_rate: self.learning_rate,
            }))?;
        }
        Ok(())
    }

    /// Mean squared difference between the output activations and the one-hot target.
    ///
    /// Diagnostic only. The value is also kept as [`last_average_error`](Self::last_average_error).
    pub fn evaluate_loss(&mut self, target: usize) -> Result<f64> {
        self.check_label(target)?;
        if self.guess.is_none() {
            return Err(NetError::MissingForwardPass);
        }
        let expected = one_hot(target, self.output_size());
        let loss = SquaredError.compute(self.output(), expected.view());
        self.last_average_error = loss;
        Ok(loss)
    }

    /// Forward, loss and backward for one labelled sample.
    pub fn train_sample(&mut self, features: &[f64], label: usize) -> Result<SampleOutcome> {
        self.check_label(label)?;
        let guess = self.forward(features)?;
        let loss = self.evaluate_loss(label)?;
        self.backward(label)?;
        Ok(SampleOutcome {
            guess,
            correct: guess == label,
            loss,
        })
    }

    fn check_label(&self, label: usize) -> Result<()> {
        let classes = self.output_size();
        if label >= classes {
            return Err(NetError::InvalidLabel { label, classes });
        }
        Ok(())
    }

    /// Guess of the most recent successful forward pass.
    pub fn guess(&self) -> Option<usize> {
        self.guess
    }

    pub fn last_average_error(&self) -> f64 {
        self.last_average_error
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NetError::invalid_parameter(
                "learning_rate".to_string(),
                format!("must be a positive finite number, got {}", learning_rate),
            ));
        }
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn topology(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::neuron_count).collect()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Mutable access to one layer's values. Shapes stay fixed.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].neuron_count()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].neuron_count()
    }

    /// Activations of the output layer.
    pub fn output(&self) -> ArrayView1<'_, f64> {
        self.layers[self.layers.len() - 1].activations()
    }

    /// Weights plus bias weights across all layers.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights().len() + layer.bias_weights().len())
            .sum()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Index of the first strictly largest value, scanning up from a running maximum of 0.0.
/// Returns 0 if no value exceeds 0.0.
pub fn argmax(values: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_value = 0.0;
    for (i, &value) in values.iter().enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}
