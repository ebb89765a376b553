//! Loss functions used for diagnostic reporting.
//!
//! The loss value never drives weight updates; the backward kernels derive their error
//! signal directly from `activation - target`.

pub mod functions;

pub use functions::{one_hot, Loss, SquaredError};
