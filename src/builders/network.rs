use crate::backend::{self, BackendKind, ComputeBackend, CpuBackend};
use crate::config::NetworkConfig;
use crate::error::Result;
use crate::layers::{ParameterInitializer, DEFAULT_INIT_SCALE};
use crate::network::{NeuralNetwork, DEFAULT_LEARNING_RATE};

/// Builder for constructing networks with a fluent API
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    topology: Vec<usize>,
    learning_rate: f64,
    seed: Option<u64>,
    init_scale: f64,
    backend: BackendKind,
}

impl NetworkBuilder {
    /// Create a new network builder for the given layer sizes
    pub fn new(topology: &[usize]) -> Self {
        NetworkBuilder {
            topology: topology.to_vec(),
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
            init_scale: DEFAULT_INIT_SCALE,
            backend: BackendKind::Cpu,
        }
    }

    /// Start from a configuration file section
    pub fn from_config(config: &NetworkConfig) -> Self {
        NetworkBuilder {
            topology: config.topology.clone(),
            learning_rate: config.learning_rate,
            seed: config.seed,
            init_scale: config.init_scale,
            backend: config.backend,
        }
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Fix the parameter seed instead of seeding from the clock
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn init_scale(mut self, init_scale: f64) -> Self {
        self.init_scale = init_scale;
        self
    }

    /// Backend used by [`build_dynamic`](Self::build_dynamic)
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    fn initializer(&self) -> Result<ParameterInitializer> {
        let initializer = match self.seed {
            Some(seed) => ParameterInitializer::from_seed(seed),
            None => ParameterInitializer::from_time(),
        };
        initializer.with_scale(self.init_scale)
    }

    /// Build on the multi-threaded CPU backend
    pub fn build(self) -> Result<NeuralNetwork<CpuBackend>> {
        self.build_with(CpuBackend::new())
    }

    /// Build on a caller-supplied backend
    pub fn build_with<B: ComputeBackend>(self, backend: B) -> Result<NeuralNetwork<B>> {
        let mut initializer = self.initializer()?;
        NeuralNetwork::with_initializer(&self.topology, backend, &mut initializer)?
            .with_learning_rate(self.learning_rate)
    }

    /// Build on the backend named by [`backend`](Self::backend), chosen at run time
    pub fn build_dynamic(self) -> Result<NeuralNetwork<Box<dyn ComputeBackend>>> {
        // Validate everything cheap before opening a device
        let mut initializer = self.initializer()?;
        crate::layers::Topology::new(&self.topology)?;
        let backend = backend::create(self.backend)?;
        NeuralNetwork::with_initializer(&self.topology, backend, &mut initializer)?
            .with_learning_rate(self.learning_rate)
    }
}
