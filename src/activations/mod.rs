//! # Activation Functions Module
//!
//! The engine uses the logistic sigmoid on every non-input layer. Outputs lie in `(0, 1)`
//! for finite inputs, which is what lets the output layer be read as per-class scores and
//! compared against a one-hot target.
//!
//! The derivative is expressed in terms of the activation *value* rather than the
//! pre-activation sum, because the backward pass only has the stored activations:
//!
//! ```rust
//! use ffnet::activations::{sigmoid, sigmoid_derivative};
//!
//! let a = sigmoid(0.0);
//! assert_eq!(a, 0.5);
//! assert_eq!(sigmoid_derivative(a), 0.25);
//! ```

pub mod functions;

pub use functions::{sigmoid, sigmoid_derivative};
