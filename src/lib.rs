//! # ffnet - Feed-Forward Network Execution Engine
//!
//! ffnet builds fully connected sigmoid networks and trains them one sample at a time
//! with plain gradient descent. The per-neuron work of every layer is handed to a
//! compute backend as a single data-parallel dispatch: a rayon-backed CPU backend by
//! default, a sequential backend for debugging and tests, and an OpenCL backend behind
//! the `gpu` feature.
//!
//! ## Key Features
//!
//! - **Layer-sequential execution**: each layer is dispatched only after the previous
//!   one has finished, so kernels always read complete inputs
//! - **Swappable backends**: the same network runs on any [`backend::ComputeBackend`]
//! - **Reproducible initialization**: seeded parameter draws in a fixed order
//! - **IDX data loading**: read MNIST-style image and label files into a [`data::Dataset`]
//!
//! ## Quick Start
//!
//! ```rust
//! use ffnet::builders::NetworkBuilder;
//!
//! let mut network = NetworkBuilder::new(&[2, 4, 2])
//!     .learning_rate(0.5)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let guess = network.forward(&[1.0, 0.0]).unwrap();
//! let loss = network.evaluate_loss(1).unwrap();
//! network.backward(1).unwrap();
//! assert!(guess < 2 && loss > 0.0);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Sigmoid and its derivative
//! - [`backend`] - Compute backends and the kernel dispatch contract
//! - [`builders`] - Fluent network construction
//! - [`config`] - JSON configuration for networks and training runs
//! - [`data`] - IDX readers and labelled datasets
//! - [`error`] - Error types and result handling
//! - [`layers`] - Layer storage, topology and parameter initialization
//! - [`loss`] - Squared-error loss and one-hot targets
//! - [`network`] - Forward and backward executors
//! - [`train`] - Epoch driver and evaluation

pub mod activations;
pub mod backend;
pub mod builders;
pub mod config;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod train;

pub use error::{NetError, Result};
pub use network::NeuralNetwork;

#[cfg(test)]
mod tests;
