//! Configuration structures for building and training networks
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```json
//! {
//!   "network": { "topology": [784, 128, 10], "learning_rate": 0.05, "seed": 7 },
//!   "training": { "epochs": 5 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::{NetError, Result};
use crate::layers::{Topology, DEFAULT_INIT_SCALE};
use crate::network::DEFAULT_LEARNING_RATE;

/// How to build a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Layer sizes, input first and output last
    pub topology: Vec<usize>,

    /// Step size of the per-sample weight update
    pub learning_rate: f64,

    /// Parameter seed; `None` seeds from the clock
    pub seed: Option<u64>,

    /// Half-width of the uniform range for initial weights and bias weights
    pub init_scale: f64,

    /// Which compute backend runs the kernels
    pub backend: BackendKind,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            topology: vec![784, 256, 10],
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
            init_scale: DEFAULT_INIT_SCALE,
            backend: BackendKind::Cpu,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        Topology::new(&self.topology)?;

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(NetError::invalid_parameter(
                "learning_rate".to_string(),
                format!("must be a positive finite number, got {}", self.learning_rate),
            ));
        }

        if !self.init_scale.is_finite() || self.init_scale <= 0.0 {
            return Err(NetError::invalid_parameter(
                "init_scale".to_string(),
                format!("must be a positive finite number, got {}", self.init_scale),
            ));
        }

        Ok(())
    }
}

/// How many epochs to run and how often to log progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub epochs: usize,

    /// Log a progress line every this many samples; 0 disables it
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 4,
            log_every: 10_000,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NetError::invalid_parameter("epochs", "must be at least 1"));
        }
        Ok(())
    }
}

/// Network and training settings read together from one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub network: NetworkConfig,
    pub training: TrainingConfig,
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ExperimentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.training.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExperimentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network.topology, vec![784, 256, 10]);
        assert_eq!(config.network.backend, BackendKind::Cpu);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ExperimentConfig::from_json_str(
            r#"{ "network": { "topology": [2, 4, 2], "seed": 3, "backend": "serial" } }"#,
        )
        .unwrap();
        assert_eq!(config.network.topology, vec![2, 4, 2]);
        assert_eq!(config.network.seed, Some(3));
        assert_eq!(config.network.backend, BackendKind::Serial);
        assert_eq!(config.network.learning_rate, DEFAULT_LEARNING_RATE);
        assert_eq!(config.training, TrainingConfig::default());
    }

    #[test]
    fn test_opencl_backend_name() {
        let config = ExperimentConfig::from_json_str(r#"{ "network": { "backend": "opencl" } }"#).unwrap();
        assert_eq!(config.network.backend, BackendKind::OpenCl);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_topology = ExperimentConfig::from_json_str(r#"{ "network": { "topology": [4] } }"#);
        assert!(matches!(bad_topology, Err(NetError::InvalidTopology { .. })));

        let bad_rate = ExperimentConfig::from_json_str(r#"{ "network": { "learning_rate": -1.0 } }"#);
        assert!(matches!(bad_rate, Err(NetError::InvalidParameter { .. })));

        let bad_epochs = ExperimentConfig::from_json_str(r#"{ "training": { "epochs": 0 } }"#);
        assert!(matches!(bad_epochs, Err(NetError::InvalidParameter { .. })));

        let negative_size = ExperimentConfig::from_json_str(r#"{ "network": { "topology": [2, -1] } }"#);
        assert!(matches!(negative_size, Err(NetError::Config(_))));

        let unknown = ExperimentConfig::from_json_str(r#"{ "network": { "layers": [2, 2] } }"#);
        assert!(matches!(unknown, Err(NetError::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "training": {{ "epochs": 2, "log_every": 0 }} }}"#).unwrap();

        let config = ExperimentConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.training.epochs, 2);
        assert_eq!(config.training.log_every, 0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ExperimentConfig::from_json_file("/nonexistent/ffnet-config.json");
        assert!(matches!(result, Err(NetError::Io(_))));
    }
}
