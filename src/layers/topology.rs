use crate::error::{NetError, Result};
use super::dense::Layer;

/// Validated list of layer sizes, input first and output last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    /// Validate a topology. Needs at least two layers and no empty layer.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(NetError::invalid_topology(format!(
                "need at least 2 layers, got {}",
                sizes.len()
            )));
        }
        if let Some(i) = sizes.iter().position(|&n| n == 0) {
            return Err(NetError::invalid_topology(format!("layer {} has no neurons", i)));
        }
        Ok(Topology {
            sizes: sizes.to_vec(),
        })
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn layer_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn input_size(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// `sum over i > 0 of sizes[i] * sizes[i - 1]`
    pub fn total_weights(&self) -> usize {
        self.sizes.windows(2).map(|w| w[0] * w[1]).sum()
    }

    /// One bias (and one bias weight) per non-input neuron.
    pub fn total_biases(&self) -> usize {
        self.sizes[1..].iter().sum()
    }

    /// Build the layer chain with zeroed parameter storage.
    pub fn build_layers(&self) -> Vec<Layer> {
        let mut layers = Vec::with_capacity(self.sizes.len());
        layers.push(Layer::input(self.sizes[0]));
        for (i, window) in self.sizes.windows(2).enumerate() {
            layers.push(Layer::dense(i + 1, window[1], window[0]));
        }
        layers
    }
}
