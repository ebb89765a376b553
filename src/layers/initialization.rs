use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;

use crate::error::{NetError, Result};
use super::dense::Layer;

/// Half-width of the symmetric uniform range used for weights and bias weights.
pub const DEFAULT_INIT_SCALE: f64 = 0.1;

/// Constant value every bias starts at; the learned part is the bias weight.
pub const DEFAULT_BIAS: f64 = 1.0;

const FALLBACK_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeds weights, bias weights and biases before the first forward pass.
///
/// Draws come from `Uniform(-scale, scale)` in a fixed order: layer by layer, each
/// layer's weight matrix row by row, then that layer's bias weights. The same seed
/// therefore always reproduces the same parameters.
#[derive(Debug, Clone)]
pub struct ParameterInitializer {
    rng: StdRng,
    seed: u64,
    scale: f64,
    bias: f64,
}

impl ParameterInitializer {
    pub fn from_seed(seed: u64) -> Self {
        ParameterInitializer {
            rng: StdRng::seed_from_u64(seed),
            seed,
            scale: DEFAULT_INIT_SCALE,
            bias: DEFAULT_BIAS,
        }
    }

    /// Seed from the wall clock so repeated runs differ.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(FALLBACK_SEED);
        Self::from_seed(seed)
    }

    pub fn with_scale(mut self, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(NetError::invalid_parameter(
                "init_scale".to_string(),
                format!("must be a positive finite number, got {}", scale),
            ));
        }
        self.scale = scale;
        Ok(self)
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Fill every non-input layer in place and return the number of random draws.
    pub fn initialize(&mut self, layers: &mut [Layer]) -> usize {
        let dist = Uniform::new(-self.scale, self.scale);
        let mut draws = 0;

        for layer in layers.iter_mut().filter(|layer| !layer.is_input()) {
            let shape = (layer.neuron_count(), layer.prev_count());
            let weights = Array2::random_using(shape, dist, &mut self.rng);
            let bias_weights = Array1::random_using(layer.neuron_count(), dist, &mut self.rng);

            layer.weights_mut().assign(&weights);
            layer.bias_weights_mut().assign(&bias_weights);
            layer.biases_mut().fill(self.bias);
            draws += weights.len() + bias_weights.len();
        }

        log::debug!("initialized {} parameters (seed {}, scale {})", draws, self.seed, self.scale);
        draws
    }
}
