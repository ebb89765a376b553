//! Online training and evaluation over a [`Dataset`].

use serde::{Deserialize, Serialize};

use crate::backend::ComputeBackend;
use crate::config::TrainingConfig;
use crate::data::Dataset;
use crate::error::{NetError, Result};
use crate::network::NeuralNetwork;

/// Totals for one pass over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// 1-based epoch number; 0 for an evaluation pass
    pub epoch: usize,
    pub samples: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub mean_loss: f64,
}

#[derive(Default)]
struct Tally {
    samples: usize,
    correct: usize,
    loss_sum: f64,
}

impl Tally {
    fn record(&mut self, correct: bool, loss: f64) {
        self.samples += 1;
        self.loss_sum += loss;
        if correct {
            self.correct += 1;
        }
    }

    fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.correct as f64 / self.samples as f64
        }
    }

    fn into_report(self, epoch: usize) -> EpochReport {
        let mean_loss = if self.samples == 0 {
            0.0
        } else {
            self.loss_sum / self.samples as f64
        };
        EpochReport {
            epoch,
            samples: self.samples,
            correct: self.correct,
            accuracy: self.accuracy(),
            mean_loss,
        }
    }
}

/// Per-sample gradient descent driver.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn check_dataset<B: ComputeBackend>(network: &NeuralNetwork<B>, dataset: &Dataset) -> Result<()> {
        if !dataset.is_empty() && dataset.feature_len() != network.input_size() {
            return Err(NetError::InputSizeMismatch {
                expected: network.input_size(),
                actual: dataset.feature_len(),
            });
        }
        dataset.validate_labels(network.output_size())
    }

    /// One pass of forward, loss and backward for every sample, in order.
    pub fn train_epoch<B: ComputeBackend>(
        &self,
        network: &mut NeuralNetwork<B>,
        dataset: &Dataset,
        epoch: usize,
    ) -> Result<EpochReport> {
        Self::check_dataset(network, dataset)?;

        let mut tally = Tally::default();
        for (features, label) in dataset.iter() {
            let outcome = network.train_sample(features, label)?;
            tally.record(outcome.correct, outcome.loss);

            if self.config.log_every > 0 && tally.samples % self.config.log_every == 0 {
                log::info!(
                    "epoch {}: {}/{} samples, accuracy {:.4}, error {:.6}",
                    epoch,
                    tally.samples,
                    dataset.len(),
                    tally.accuracy(),
                    network.last_average_error()
                );
            }
        }

        let report = tally.into_report(epoch);
        log::info!(
            "epoch {} finished: {}/{} correct ({:.2}%), mean loss {:.6}",
            report.epoch,
            report.correct,
            report.samples,
            report.accuracy * 100.0,
            report.mean_loss
        );
        Ok(report)
    }

    /// Run the configured number of epochs.
    pub fn fit<B: ComputeBackend>(
        &self,
        network: &mut NeuralNetwork<B>,
        dataset: &Dataset,
    ) -> Result<Vec<EpochReport>> {
        (1..=self.config.epochs)
            .map(|epoch| self.train_epoch(network, dataset, epoch))
            .collect()
    }

    /// Score a held-out set with forward passes only; weights are not touched.
    pub fn evaluate<B: ComputeBackend>(
        &self,
        network: &mut NeuralNetwork<B>,
        dataset: &Dataset,
    ) -> Result<EpochReport> {
        Self::check_dataset(network, dataset)?;

        let mut tally = Tally::default();
        for (features, label) in dataset.iter() {
            let guess = network.forward(features)?;
            let loss = network.evaluate_loss(label)?;
            tally.record(guess == label, loss);
        }

        let report = tally.into_report(0);
        log::info!(
            "evaluation: {}/{} correct ({:.2}%), mean loss {:.6}",
            report.correct,
            report.samples,
            report.accuracy * 100.0,
            report.mean_loss
        );
        Ok(report)
    }
}
